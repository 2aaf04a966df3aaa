//! Integration tests for the geofence engine.
//!
//! These tests verify the complete flow:
//! - provider watch event → tracker → evaluator → notification delivery
//! - accuracy fallback and error surfacing through the engine observables
//! - visibility-driven re-subscription
//!
//! Run with: `cargo test --test engine_integration`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use georeminder::coord::Coordinate;
use georeminder::engine::{EngineConfig, EngineHandle, GeofenceEngine, NOTIFICATION_TITLE};
use georeminder::location::{
    CapabilityError, LocationProvider, PositionSample, ProviderError, ProviderErrorCode,
    Visibility, WatchEvent, WatchId, WatchOptions, MSG_PERMISSION_DENIED,
};
use georeminder::notify::{
    DeliveryError, NotificationOptions, NotificationPlatform, NotificationSurface,
    PermissionState,
};
use georeminder::task::{GeofenceTask, TaskSource};

// ============================================================================
// Scripted platform seams
// ============================================================================

/// A live watch opened on the scripted provider.
#[derive(Clone)]
struct OpenWatch {
    id: WatchId,
    options: WatchOptions,
    events: mpsc::UnboundedSender<WatchEvent>,
}

/// Provider whose watches the test drives by hand.
struct ScriptedProvider {
    next_id: AtomicU64,
    watches: Mutex<Vec<OpenWatch>>,
    cleared: Mutex<Vec<WatchId>>,
}

impl ScriptedProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            watches: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
        })
    }

    fn latest_watch(&self) -> OpenWatch {
        self.watches.lock().unwrap().last().cloned().unwrap()
    }

    fn watch_count(&self) -> usize {
        self.watches.lock().unwrap().len()
    }

    fn send_sample(&self, coordinate: Coordinate, captured_at: Instant) {
        let watch = self.latest_watch();
        watch
            .events
            .send(WatchEvent::sample(
                watch.id,
                PositionSample::at(coordinate, captured_at),
            ))
            .expect("engine should be listening");
    }

    fn send_error(&self, code: ProviderErrorCode) {
        let watch = self.latest_watch();
        watch
            .events
            .send(WatchEvent::error(
                watch.id,
                ProviderError::new(code, "scripted"),
            ))
            .expect("engine should be listening");
    }
}

impl LocationProvider for ScriptedProvider {
    fn watch(
        &self,
        options: WatchOptions,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<WatchId, CapabilityError> {
        let id = WatchId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.watches.lock().unwrap().push(OpenWatch {
            id,
            options,
            events,
        });
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        self.cleared.lock().unwrap().push(id);
    }
}

/// Notification platform with a working background path and a recording
/// direct path.
struct ScriptedPlatform {
    permission: PermissionState,
    background_available: bool,
    background_shown: Arc<Mutex<Vec<(String, NotificationOptions)>>>,
    direct_shown: Arc<Mutex<Vec<(String, NotificationOptions)>>>,
}

impl ScriptedPlatform {
    fn granted() -> Arc<Self> {
        Arc::new(Self {
            permission: PermissionState::Granted,
            background_available: true,
            background_shown: Arc::new(Mutex::new(Vec::new())),
            direct_shown: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn total_notifications(&self) -> usize {
        self.background_shown.lock().unwrap().len() + self.direct_shown.lock().unwrap().len()
    }
}

struct ScriptedSurface {
    shown: Arc<Mutex<Vec<(String, NotificationOptions)>>>,
}

impl NotificationSurface for ScriptedSurface {
    fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> BoxFuture<'_, Result<(), DeliveryError>> {
        let shown = Arc::clone(&self.shown);
        let title = title.to_string();
        let options = options.clone();
        Box::pin(async move {
            shown.lock().unwrap().push((title, options));
            Ok(())
        })
    }
}

impl NotificationPlatform for ScriptedPlatform {
    fn permission(&self) -> PermissionState {
        self.permission
    }

    fn request_permission(&self) -> BoxFuture<'_, PermissionState> {
        let state = self.permission;
        Box::pin(async move { state })
    }

    fn background_ready(
        &self,
    ) -> Option<BoxFuture<'_, Result<Box<dyn NotificationSurface>, DeliveryError>>> {
        if !self.background_available {
            return None;
        }
        let surface = ScriptedSurface {
            shown: Arc::clone(&self.background_shown),
        };
        Some(Box::pin(async move {
            Ok(Box::new(surface) as Box<dyn NotificationSurface>)
        }))
    }

    fn deliver_direct(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), DeliveryError> {
        self.direct_shown
            .lock()
            .unwrap()
            .push((title.to_string(), options.clone()));
        Ok(())
    }
}

/// Task source over a shared, test-mutable list.
struct SharedTasks(Mutex<Vec<GeofenceTask>>);

impl SharedTasks {
    fn new(tasks: Vec<GeofenceTask>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(tasks)))
    }

    fn push(&self, task: GeofenceTask) {
        self.0.lock().unwrap().push(task);
    }
}

impl TaskSource for SharedTasks {
    fn snapshot(&self) -> Vec<GeofenceTask> {
        self.0.lock().unwrap().clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Madrid city center, the fence used throughout.
const FENCE: Coordinate = Coordinate {
    lat: 40.4168,
    lng: -3.7038,
};

fn fence_task(id: &str) -> GeofenceTask {
    GeofenceTask {
        id: id.to_string(),
        title: format!("Errand {id}"),
        description: "Pick something up".to_string(),
        due_date: None,
        location: Some(FENCE),
        radius: 200.0,
        is_completed: false,
        created_at: 0,
    }
}

/// A position ~9 km north of the fence.
fn far_away() -> Coordinate {
    Coordinate::new(FENCE.lat + 0.08, FENCE.lng)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

struct Harness {
    provider: Arc<ScriptedProvider>,
    platform: Arc<ScriptedPlatform>,
    tasks: Arc<SharedTasks>,
    handle: EngineHandle,
    shutdown: CancellationToken,
    engine_task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start(tasks: Vec<GeofenceTask>) -> Self {
        let provider = ScriptedProvider::new();
        let platform = ScriptedPlatform::granted();
        let tasks = SharedTasks::new(tasks);

        let (engine, handle) = GeofenceEngine::new(
            Arc::clone(&provider),
            Arc::clone(&platform),
            Arc::clone(&tasks),
            EngineConfig::default(),
        );

        let shutdown = CancellationToken::new();
        let engine_task = tokio::spawn(engine.run(shutdown.clone()));
        settle().await; // let the engine open its first watch

        Self {
            provider,
            platform,
            tasks,
            handle,
            shutdown,
            engine_task,
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        let _ = self.engine_task.await;
    }
}

// ============================================================================
// Integration tests
// ============================================================================

/// Provider sample inside the fence produces exactly one notification,
/// delivered through the background path.
#[tokio::test]
async fn test_sample_to_notification_flow() {
    let h = Harness::start(vec![fence_task("t1")]).await;
    let base = Instant::now();

    h.provider.send_sample(FENCE, base);
    settle().await;

    let shown = h.platform.background_shown.lock().unwrap().clone();
    assert_eq!(shown.len(), 1);
    let (title, options) = &shown[0];
    assert_eq!(title, NOTIFICATION_TITLE);
    assert!(options.body.contains("Errand t1"));
    assert_eq!(options.tag, "geofence-t1");
    assert!(h.platform.direct_shown.lock().unwrap().is_empty());

    // Position observable updated, no error.
    assert_eq!(h.handle.position(), Some(FENCE));
    assert_eq!(h.handle.location_error(), None);

    // A later sample still inside the fence does not re-notify.
    h.provider.send_sample(FENCE, base + Duration::from_secs(3));
    settle().await;
    assert_eq!(h.platform.total_notifications(), 1);

    h.stop().await;
}

/// Samples arriving faster than the throttle interval are dropped before
/// they reach the evaluator or the observables.
#[tokio::test]
async fn test_throttled_samples_are_invisible() {
    let h = Harness::start(vec![fence_task("t1")]).await;
    let base = Instant::now();

    h.provider.send_sample(far_away(), base);
    settle().await;
    assert_eq!(h.handle.position(), Some(far_away()));

    // 500 ms later, inside the fence: throttled away, nothing fires.
    h.provider
        .send_sample(FENCE, base + Duration::from_millis(500));
    settle().await;
    assert_eq!(h.handle.position(), Some(far_away()));
    assert_eq!(h.platform.total_notifications(), 0);

    // Past the interval the fence entry lands.
    h.provider.send_sample(FENCE, base + Duration::from_secs(2));
    settle().await;
    assert_eq!(h.platform.total_notifications(), 1);

    h.stop().await;
}

/// A timeout in high-accuracy mode silently re-subscribes with the
/// low-accuracy options; samples keep flowing on the new watch.
#[tokio::test]
async fn test_accuracy_fallback_keeps_tracking() {
    let h = Harness::start(vec![]).await;

    let first = h.provider.latest_watch();
    assert!(first.options.high_accuracy);

    h.provider.send_error(ProviderErrorCode::Timeout);
    settle().await;

    assert_eq!(h.provider.watch_count(), 2);
    let second = h.provider.latest_watch();
    assert!(!second.options.high_accuracy);

    // The new watch delivers a fix; no error ever surfaced.
    h.provider.send_sample(FENCE, Instant::now());
    settle().await;
    assert_eq!(h.handle.position(), Some(FENCE));
    assert_eq!(h.handle.location_error(), None);

    h.stop().await;
}

/// Permission denial before any fix surfaces a user-facing error and does
/// not change the subscription.
#[tokio::test]
async fn test_permission_denied_surfaces_error() {
    let h = Harness::start(vec![]).await;

    h.provider.send_error(ProviderErrorCode::PermissionDenied);
    settle().await;

    assert_eq!(h.handle.location_error().as_deref(), Some(MSG_PERMISSION_DENIED));
    assert_eq!(h.provider.watch_count(), 1);

    h.stop().await;
}

/// Backgrounding re-subscribes with low-accuracy options; foregrounding
/// restores the selected mode's options.
#[tokio::test]
async fn test_visibility_resubscription() {
    let h = Harness::start(vec![]).await;

    h.handle.visibility_changed(Visibility::Background);
    settle().await;
    assert_eq!(h.provider.watch_count(), 2);
    assert!(!h.provider.latest_watch().options.high_accuracy);

    h.handle.visibility_changed(Visibility::Foreground);
    settle().await;
    assert_eq!(h.provider.watch_count(), 3);
    assert!(h.provider.latest_watch().options.high_accuracy);

    h.stop().await;
}

/// Adding a task while already inside its fence fires on the task-change
/// signal without waiting for a new sample.
#[tokio::test]
async fn test_task_added_inside_fence_fires_on_change_signal() {
    let h = Harness::start(vec![]).await;

    h.provider.send_sample(FENCE, Instant::now());
    settle().await;
    assert_eq!(h.platform.total_notifications(), 0);

    h.tasks.push(fence_task("late"));
    h.handle.tasks_changed();
    settle().await;

    assert_eq!(h.platform.total_notifications(), 1);

    h.stop().await;
}

/// Shutdown cancels the active watch.
#[tokio::test]
async fn test_shutdown_clears_watch() {
    let h = Harness::start(vec![]).await;
    let watch = h.provider.latest_watch().id;

    let provider = Arc::clone(&h.provider);
    h.stop().await;

    assert!(provider.cleared.lock().unwrap().contains(&watch));
}
