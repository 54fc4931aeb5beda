//! Lifecycle of the single active workout.
//!
//! All transitions (`start`, incoming fixes, `end`) run under one lock, so a
//! fix can never land in a route that `end` is already finalizing. Location
//! updates are consumed by a background task that applies one fix at a time
//! in arrival order, and workout submission runs in its own task so that
//! `end` never waits on the network.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{WorkoutStore, WorkoutSubmission};
use crate::catalog::{CatalogLoad, WorkoutCatalog};
use crate::error::TrackerError;
use crate::intensity::{IntensityEstimator, IntensityProfile};
use crate::location::{LocationError, LocationProvider};
use crate::models::{Credentials, LocationSample, Route, Workout, WorkoutTotals, WorkoutType};
use crate::route::RouteAccumulator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
}

/// Sync state of the most recently finished workout
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Pending {
        workout_id: String,
    },
    Synced {
        workout_id: String,
        remote_id: Option<String>,
    },
    Failed {
        workout_id: String,
        message: String,
    },
}

impl SyncStatus {
    pub fn workout_id(&self) -> Option<&str> {
        match self {
            SyncStatus::Idle => None,
            SyncStatus::Pending { workout_id }
            | SyncStatus::Synced { workout_id, .. }
            | SyncStatus::Failed { workout_id, .. } => Some(workout_id),
        }
    }
}

/// Observable view of the session for the presentation layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub active_workout: Option<Workout>,
    /// Location updates are being consumed
    pub tracking: bool,
    pub current_location: Option<LocationSample>,
    pub route_points: usize,
    pub distance_m: f64,
    pub location_warning: Option<String>,
    pub sync: SyncStatus,
}

/// Caller-supplied values that take precedence over computed metrics
#[derive(Debug, Clone, Default)]
pub struct EndOptions {
    pub distance_m: Option<f64>,
    pub calories: Option<i32>,
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Synced { remote_id: Option<String> },
    Failed(String),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced { .. })
    }
}

/// Handle on a workout submission running in the background
#[derive(Debug)]
pub struct SyncHandle {
    handle: JoinHandle<SyncOutcome>,
}

impl SyncHandle {
    pub async fn wait(self) -> SyncOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => SyncOutcome::Failed(format!("Submission task aborted: {}", e)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A finalized workout together with its pending submission
#[derive(Debug)]
pub struct FinishedWorkout {
    pub workout: Workout,
    pub sync: SyncHandle,
}

struct ActiveWorkout {
    workout: Workout,
    route: RouteAccumulator,
    tracking: CancellationToken,
}

enum SessionState {
    Idle,
    Active(ActiveWorkout),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active(_) => "active",
        }
    }
}

struct Shared {
    state: Mutex<SessionState>,
    status: watch::Sender<SessionSnapshot>,
    credentials: RwLock<Credentials>,
    catalog: WorkoutCatalog,
    estimator: IntensityEstimator,
    reject_out_of_order: bool,
}

impl Shared {
    /// Apply one fix to the active route. `workout_id` pins the fix to the
    /// workout whose tracking task received it.
    async fn apply_sample(
        &self,
        workout_id: Option<&str>,
        sample: LocationSample,
    ) -> Result<bool, TrackerError> {
        let mut state = self.state.lock().await;

        let active = match &mut *state {
            SessionState::Active(active) => active,
            SessionState::Idle => {
                tracing::debug!("Discarding location sample, no active workout");
                return Ok(false);
            }
        };

        if workout_id.is_some_and(|id| id != active.workout.id) {
            return Ok(false);
        }

        active.route.append(sample.clone())?;

        let points = active.route.len();
        let distance_m = active.route.total_distance_m();
        tracing::debug!(
            "Route point {} at {},{} ({:.1} m)",
            points,
            sample.latitude,
            sample.longitude,
            distance_m
        );

        self.status.send_modify(|s| {
            s.current_location = Some(sample);
            s.route_points = points;
            s.distance_m = distance_m;
        });

        Ok(true)
    }

    async fn location_failed(&self, workout_id: &str, error: LocationError) {
        let state = self.state.lock().await;
        if !matches!(&*state, SessionState::Active(a) if a.workout.id == workout_id) {
            return;
        }

        let err = TrackerError::LocationUnavailable(error.to_string());
        tracing::warn!("{}, workout continues", err);
        self.status
            .send_modify(|s| s.location_warning = Some(err.to_string()));
    }

    async fn updates_ended(&self, workout_id: &str) {
        let state = self.state.lock().await;
        if matches!(&*state, SessionState::Active(a) if a.workout.id == workout_id) {
            tracing::debug!("Location updates ended for workout {}", workout_id);
            self.status.send_modify(|s| s.tracking = false);
        }
    }
}

/// Owner of the workout lifecycle: `Idle -> start -> Active -> end -> Idle`
pub struct WorkoutSession {
    shared: Arc<Shared>,
    store: Arc<dyn WorkoutStore>,
    provider: Arc<dyn LocationProvider>,
    shutdown: CancellationToken,
}

impl WorkoutSession {
    pub fn new(
        store: Arc<dyn WorkoutStore>,
        provider: Arc<dyn LocationProvider>,
        catalog: WorkoutCatalog,
    ) -> Self {
        Self::with_options(
            store,
            provider,
            catalog,
            IntensityProfile::default(),
            true,
        )
    }

    pub fn with_options(
        store: Arc<dyn WorkoutStore>,
        provider: Arc<dyn LocationProvider>,
        catalog: WorkoutCatalog,
        intensity: IntensityProfile,
        reject_out_of_order: bool,
    ) -> Self {
        let (status, _) = watch::channel(SessionSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Idle),
                status,
                credentials: RwLock::new(Credentials::default()),
                catalog,
                estimator: IntensityEstimator::new(intensity),
                reject_out_of_order,
            }),
            store,
            provider,
            shutdown: CancellationToken::new(),
        }
    }

    pub async fn set_credentials(&self, credentials: Credentials) {
        *self.shared.credentials.write().await = credentials;
    }

    pub fn catalog(&self) -> &WorkoutCatalog {
        &self.shared.catalog
    }

    /// Reload the catalog from the store using the current credentials
    pub async fn load_catalog(&self) -> CatalogLoad {
        let credentials = self.shared.credentials.read().await.clone();
        self.shared
            .catalog
            .load_remote(self.store.as_ref(), &credentials)
            .await
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.status.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.status.borrow().clone()
    }

    pub async fn is_active(&self) -> bool {
        matches!(&*self.shared.state.lock().await, SessionState::Active(_))
    }

    pub async fn active_workout(&self) -> Option<Workout> {
        match &*self.shared.state.lock().await {
            SessionState::Active(active) => Some(active.workout.clone()),
            SessionState::Idle => None,
        }
    }

    /// Copy of the route collected so far
    pub async fn route(&self) -> Route {
        match &*self.shared.state.lock().await {
            SessionState::Active(active) => active.route.route().clone(),
            SessionState::Idle => Route::new(),
        }
    }

    pub async fn start(&self, workout_type: WorkoutType) -> Result<Workout, TrackerError> {
        self.start_at(workout_type, Utc::now()).await
    }

    /// Start a workout and begin consuming location updates
    pub async fn start_at(
        &self,
        workout_type: WorkoutType,
        start_time: DateTime<Utc>,
    ) -> Result<Workout, TrackerError> {
        let mut state = self.shared.state.lock().await;

        if let SessionState::Active(active) = &*state {
            tracing::warn!(
                "Refusing to start workout, {} is still active",
                active.workout.id
            );
            return Err(TrackerError::InvalidStateTransition {
                state: state.name(),
                action: "start a workout",
            });
        }

        let workout = Workout::start(workout_type, start_time);
        let mut route = RouteAccumulator::new(self.shared.reject_out_of_order);
        route.reset();
        let tracking = self.shutdown.child_token();

        *state = SessionState::Active(ActiveWorkout {
            workout: workout.clone(),
            route,
            tracking: tracking.clone(),
        });

        self.shared.status.send_modify(|s| {
            s.phase = SessionPhase::Active;
            s.active_workout = Some(workout.clone());
            s.tracking = !tracking.is_cancelled();
            s.current_location = None;
            s.route_points = 0;
            s.distance_m = 0.0;
            s.location_warning = None;
        });

        self.spawn_tracking(workout.id.clone(), tracking);

        tracing::info!("Started {} workout {}", workout_type, workout.id);
        Ok(workout)
    }

    fn spawn_tracking(&self, workout_id: String, tracking: CancellationToken) {
        let mut updates = self.provider.updates();
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = tracking.cancelled() => break,
                    event = updates.next() => match event {
                        Some(Ok(sample)) => {
                            if let Err(e) = shared.apply_sample(Some(&workout_id), sample).await {
                                tracing::warn!("Dropping location sample: {}", e);
                            }
                        }
                        Some(Err(e)) => shared.location_failed(&workout_id, e).await,
                        None => {
                            shared.updates_ended(&workout_id).await;
                            break;
                        }
                    },
                }
            }
        });
    }

    /// Feed one fix into the active route.
    ///
    /// Returns `Ok(false)` if no workout is active and the fix was discarded.
    pub async fn on_location_sample(&self, sample: LocationSample) -> Result<bool, TrackerError> {
        self.shared.apply_sample(None, sample).await
    }

    pub async fn end(&self, options: EndOptions) -> Result<FinishedWorkout, TrackerError> {
        self.end_at(options, Utc::now()).await
    }

    /// Finalize the active workout, record it in the catalog and submit it.
    ///
    /// The workout stays in the catalog whatever the store answers; the
    /// submission result arrives through the returned [`SyncHandle`] and the
    /// snapshot's [`SyncStatus`].
    pub async fn end_at(
        &self,
        options: EndOptions,
        end_time: DateTime<Utc>,
    ) -> Result<FinishedWorkout, TrackerError> {
        let mut state = self.shared.state.lock().await;

        let active = match std::mem::replace(&mut *state, SessionState::Idle) {
            SessionState::Active(active) => active,
            SessionState::Idle => {
                return Err(TrackerError::InvalidStateTransition {
                    state: "idle",
                    action: "end a workout",
                });
            }
        };

        let ActiveWorkout {
            workout,
            mut route,
            tracking,
        } = active;
        tracking.cancel();

        let (route, running_total) = route.take();
        let estimator = &self.shared.estimator;
        let workout_type = workout.workout_type;

        let distance_m = options.distance_m.unwrap_or(running_total);
        let calories = options
            .calories
            .unwrap_or_else(|| estimator.calories_for_distance(distance_m, workout_type));
        let heart_rate = options
            .heart_rate
            .unwrap_or_else(|| estimator.estimate_heart_rate(&route, workout_type));

        let finished = workout.finalize(
            end_time,
            WorkoutTotals {
                distance_m,
                calories,
                heart_rate,
            },
            options.notes,
            route,
        );

        self.shared.catalog.append(finished.clone()).await;

        self.shared.status.send_modify(|s| {
            s.phase = SessionPhase::Idle;
            s.active_workout = None;
            s.tracking = false;
            s.current_location = None;
            s.route_points = 0;
            s.distance_m = 0.0;
            s.location_warning = None;
            s.sync = SyncStatus::Pending {
                workout_id: finished.id.clone(),
            };
        });
        drop(state);

        tracing::info!(
            "Finished workout {}: {:.1} m, {} kcal, {} bpm",
            finished.id,
            distance_m,
            calories,
            heart_rate
        );

        let sync = self.submit(&finished).await;

        Ok(FinishedWorkout {
            workout: finished,
            sync,
        })
    }

    async fn submit(&self, workout: &Workout) -> SyncHandle {
        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        let credentials = self.shared.credentials.read().await.clone();
        let submission = WorkoutSubmission::from_workout(workout);
        let workout_id = workout.id.clone();

        let handle = tokio::spawn(async move {
            let outcome = match store.save_workout(&credentials, &submission).await {
                Ok(receipt) => SyncOutcome::Synced {
                    remote_id: receipt.remote_id,
                },
                Err(e) => {
                    let err = TrackerError::Submission(e);
                    tracing::warn!("Workout {} kept locally only: {}", workout_id, err);
                    SyncOutcome::Failed(err.to_string())
                }
            };

            let status = match &outcome {
                SyncOutcome::Synced { remote_id } => SyncStatus::Synced {
                    workout_id,
                    remote_id: remote_id.clone(),
                },
                SyncOutcome::Failed(message) => SyncStatus::Failed {
                    workout_id,
                    message: message.clone(),
                },
            };
            // A later workout owns the status once it has ended
            shared.status.send_if_modified(|s| {
                if s.sync.workout_id() != status.workout_id() {
                    return false;
                }
                s.sync = status;
                true
            });

            outcome
        });

        SyncHandle { handle }
    }

    /// Stop consuming location updates for good. Safe to call repeatedly.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::debug!("Stopping location updates");
        }
        self.shutdown.cancel();
        self.shared.status.send_modify(|s| s.tracking = false);
    }
}

impl Drop for WorkoutSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
