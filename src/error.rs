use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::ApiError;

/// Errors raised by the workout tracking core
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Cannot {action} while session is {state}")]
    InvalidStateTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("Location sample at {received} is older than previous sample at {previous}")]
    SampleOutOfOrder {
        previous: DateTime<Utc>,
        received: DateTime<Utc>,
    },

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Workout submission failed: {0}")]
    Submission(#[from] ApiError),

    #[error("Failed to load workouts: {0}")]
    Load(String),
}

impl TrackerError {
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, TrackerError::InvalidStateTransition { .. })
    }
}
