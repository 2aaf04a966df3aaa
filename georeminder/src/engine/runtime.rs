//! The engine event loop and its host-facing handle.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::EngineConfig;
use crate::coord::Coordinate;
use crate::evaluator::GeofenceEvaluator;
use crate::location::{LocationProvider, LocationTracker, Visibility, WatchEvent};
use crate::notify::{NotificationChannel, NotificationOptions, NotificationPlatform};
use crate::task::{GeofenceTask, TaskSource};

/// Title of every arrival notification.
pub const NOTIFICATION_TITLE: &str = "📍 You've arrived at your destination!";

/// Vibration pattern for arrival notifications (vibrate, pause, vibrate).
const NOTIFICATION_VIBRATE: [u64; 3] = [200, 100, 200];

/// Commands the host can send to a running engine.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Seed the current position manually (the "locate me" control).
    UpdateLocation {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },
    /// The application moved between foreground and background.
    VisibilityChanged(Visibility),
    /// The external task list changed (task added/completed/deleted).
    TasksChanged,
}

/// The geofencing and notification engine.
///
/// Owns the tracker, evaluator, and notification channel. Created together
/// with its [`EngineHandle`]; consumed by [`run`](Self::run).
pub struct GeofenceEngine<P, N, T>
where
    P: LocationProvider,
    N: NotificationPlatform,
    T: TaskSource,
{
    core: EngineCore<P, N, T>,
    provider_rx: mpsc::UnboundedReceiver<WatchEvent>,
    command_rx: mpsc::UnboundedReceiver<EngineCommand>,
}

/// Everything the event loop mutates, separated from the receivers it
/// selects over.
struct EngineCore<P, N, T>
where
    P: LocationProvider,
    N: NotificationPlatform,
    T: TaskSource,
{
    tracker: LocationTracker<P>,
    evaluator: GeofenceEvaluator,
    channel: Arc<NotificationChannel<N>>,
    tasks: Arc<T>,
    config: EngineConfig,
    position_tx: watch::Sender<Option<Coordinate>>,
    error_tx: watch::Sender<Option<String>>,
}

/// Host-facing handle to a running [`GeofenceEngine`].
///
/// Cheap to clone; commands are fire-and-forget and silently dropped once
/// the engine has shut down.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<EngineCommand>,
    position_rx: watch::Receiver<Option<Coordinate>>,
    error_rx: watch::Receiver<Option<String>>,
}

impl EngineHandle {
    /// Seed the current position without waiting for a provider sample.
    pub fn update_location(&self, lat: f64, lng: f64) {
        let _ = self.commands.send(EngineCommand::UpdateLocation { lat, lng });
    }

    /// Report an application visibility change.
    pub fn visibility_changed(&self, visibility: Visibility) {
        let _ = self
            .commands
            .send(EngineCommand::VisibilityChanged(visibility));
    }

    /// Report that the external task list changed.
    pub fn tasks_changed(&self) {
        let _ = self.commands.send(EngineCommand::TasksChanged);
    }

    /// Latest known position, if any.
    pub fn position(&self) -> Option<Coordinate> {
        *self.position_rx.borrow()
    }

    /// Current user-facing location error, if any.
    pub fn location_error(&self) -> Option<String> {
        self.error_rx.borrow().clone()
    }

    /// Observable position stream for reactive consumers.
    pub fn position_watch(&self) -> watch::Receiver<Option<Coordinate>> {
        self.position_rx.clone()
    }

    /// Observable error stream for reactive consumers.
    pub fn error_watch(&self) -> watch::Receiver<Option<String>> {
        self.error_rx.clone()
    }
}

impl<P, N, T> GeofenceEngine<P, N, T>
where
    P: LocationProvider,
    N: NotificationPlatform,
    T: TaskSource,
{
    /// Create an engine and its handle.
    pub fn new(
        provider: Arc<P>,
        platform: Arc<N>,
        tasks: Arc<T>,
        config: EngineConfig,
    ) -> (Self, EngineHandle) {
        let (tracker, provider_rx) = LocationTracker::new(provider, config.tracker.clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (position_tx, position_rx) = watch::channel(None);
        let (error_tx, error_rx) = watch::channel(None);

        let engine = Self {
            core: EngineCore {
                tracker,
                evaluator: GeofenceEvaluator::new(),
                channel: Arc::new(NotificationChannel::new(platform)),
                tasks,
                config,
                position_tx,
                error_tx,
            },
            provider_rx,
            command_rx,
        };

        let handle = EngineHandle {
            commands: command_tx,
            position_rx,
            error_rx,
        };

        (engine, handle)
    }

    /// Run the engine until shutdown is signalled.
    ///
    /// Requests notification permission once, starts the tracker, then
    /// processes provider events and host commands in arrival order.
    /// Notification dispatch is spawned fire-and-forget so the sample path
    /// never blocks on delivery.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("geofence engine starting");

        let Self {
            mut core,
            mut provider_rx,
            mut command_rx,
        } = self;

        let permission = core.channel.request_permission().await;
        info!(?permission, "notification permission state");

        core.tracker.start();
        core.publish_state();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("geofence engine shutting down");
                    break;
                }

                Some(command) = command_rx.recv() => {
                    core.handle_command(command);
                }

                Some(event) = provider_rx.recv() => {
                    if let Some(sample) = core.tracker.handle_event(event) {
                        core.publish_state();
                        core.evaluate_at(sample.coordinate);
                    } else {
                        // Errors and mode transitions also move observable state.
                        core.publish_state();
                    }
                }
            }
        }

        core.tracker.stop();
        core.publish_state();
        info!("geofence engine stopped");
    }
}

impl<P, N, T> EngineCore<P, N, T>
where
    P: LocationProvider,
    N: NotificationPlatform,
    T: TaskSource,
{
    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::UpdateLocation { lat, lng } => {
                let coordinate = Coordinate::new(lat, lng);
                debug!(lat, lng, "manual location update");
                self.tracker.seed_position(coordinate);
                self.publish_state();
                self.evaluate_at(coordinate);
            }
            EngineCommand::VisibilityChanged(visibility) => {
                self.tracker.on_visibility_change(visibility);
                self.publish_state();
            }
            EngineCommand::TasksChanged => {
                if let Some(position) = self.tracker.position() {
                    self.evaluate_at(position);
                }
            }
        }
    }

    /// One evaluator pass; dispatches a notification per new fence entry.
    fn evaluate_at(&mut self, position: Coordinate) {
        let tasks = self.tasks.snapshot();
        let events = self.evaluator.evaluate(position, &tasks);

        for event in events {
            let Some(task) = tasks.iter().find(|t| t.id == event.task_id) else {
                continue;
            };
            let options = self.arrival_options(task);
            let channel = Arc::clone(&self.channel);

            // Fire-and-forget: the channel logs and swallows failures.
            tokio::spawn(async move {
                channel.notify(NOTIFICATION_TITLE, &options).await;
            });
        }
    }

    fn arrival_options(&self, task: &GeofenceTask) -> NotificationOptions {
        NotificationOptions {
            body: format!("You're near: {}\n{}", task.title, task.description),
            tag: format!("geofence-{}", task.id),
            icon: self.config.notification_icon.clone(),
            badge: self.config.notification_badge.clone(),
            renotify: true,
            vibrate: NOTIFICATION_VIBRATE.to_vec(),
            data: Some(json!({ "taskId": task.id })),
        }
    }

    fn publish_state(&self) {
        let _ = self.position_tx.send_replace(self.tracker.position());
        let _ = self
            .error_tx
            .send_replace(self.tracker.error().map(String::from));
    }
}
