use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiError, WorkoutListing, WorkoutStore};
use crate::models::{Credentials, Workout};

/// Outcome of populating the catalog from the workout store
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogLoad {
    Loaded(usize),
    Empty,
    /// The store could not be read; the catalog was left empty
    Failed(String),
}

/// Finished workouts in insertion order.
///
/// Cloning yields another handle to the same list. Readers always get a full
/// copy, never a view of a half-applied change.
#[derive(Debug, Clone, Default)]
pub struct WorkoutCatalog {
    workouts: Arc<RwLock<Vec<Workout>>>,
}

impl WorkoutCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Workout> {
        self.workouts.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.workouts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workouts.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Workout> {
        self.workouts
            .read()
            .await
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    pub async fn append(&self, workout: Workout) {
        tracing::debug!("Adding workout {} to catalog", workout.id);
        self.workouts.write().await.push(workout);
    }

    async fn replace(&self, workouts: Vec<Workout>) {
        *self.workouts.write().await = workouts;
    }

    /// Replace the catalog with the workouts kept by the store.
    ///
    /// Never fails: a missing token, an unreachable store or a malformed
    /// record all leave the catalog empty.
    pub async fn load_remote(
        &self,
        store: &dyn WorkoutStore,
        credentials: &Credentials,
    ) -> CatalogLoad {
        if !credentials.has_token() {
            tracing::debug!("No auth token, starting with an empty catalog");
            self.replace(Vec::new()).await;
            return CatalogLoad::Empty;
        }

        let result = match store.get_workouts(credentials).await {
            Ok(WorkoutListing::NoWorkouts) => Ok(Vec::new()),
            Ok(WorkoutListing::Records(records)) => records
                .into_iter()
                .map(|record| record.into_workout())
                .collect::<Result<Vec<_>, ApiError>>(),
            Err(e) => Err(e),
        };

        match result {
            Ok(workouts) if workouts.is_empty() => {
                self.replace(workouts).await;
                CatalogLoad::Empty
            }
            Ok(workouts) => {
                let count = workouts.len();
                self.replace(workouts).await;
                tracing::info!("Loaded {} workouts", count);
                CatalogLoad::Loaded(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load workouts: {}", e);
                self.replace(Vec::new()).await;
                CatalogLoad::Failed(e.to_string())
            }
        }
    }
}
