// Library exports for run-tracker
// The CLI binary is a thin shell over these modules

pub mod api;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod geo;
pub mod intensity;
pub mod location;
pub mod models;
pub mod route;
pub mod session;

pub use catalog::{CatalogLoad, WorkoutCatalog};
pub use error::TrackerError;
pub use session::{
    EndOptions, FinishedWorkout, SessionPhase, SessionSnapshot, SyncHandle, SyncOutcome,
    SyncStatus, WorkoutSession,
};
