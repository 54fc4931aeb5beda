//! Wire formats of the workout store.
//!
//! Distances cross this boundary in kilometers; everywhere else in the crate
//! they are meters.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::ApiError;
use crate::models::{LocationSample, Route, Workout, WorkoutType};

/// Message the store sends instead of an empty record list
pub const NO_WORKOUTS_MESSAGE: &str = "No workouts found.";

/// Timestamp pattern of `created_at` in stored records
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const EMPTY_LOCATION: &str = "0,0";

/// Summary of a finished workout as accepted by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSubmission {
    /// Kilometers
    pub distance: f64,
    /// Whole seconds
    pub duration: i64,
    /// Kilometers per hour
    pub average_speed: f64,
    pub calories_burned: i32,
    pub start_location: String,
    pub end_location: String,
}

impl WorkoutSubmission {
    pub fn from_workout(workout: &Workout) -> Self {
        let location = |sample: Option<&LocationSample>| {
            sample
                .map(|s| s.coordinate().to_string())
                .unwrap_or_else(|| EMPTY_LOCATION.to_string())
        };

        Self {
            distance: workout.distance_km(),
            duration: workout.duration_seconds(),
            average_speed: workout.average_speed_kmh(),
            calories_burned: workout.calories.unwrap_or(0),
            start_location: location(workout.route.first()),
            end_location: location(workout.route.last()),
        }
    }
}

/// Response to a workout submission
#[derive(Debug, Clone, Deserialize)]
pub struct SaveWorkoutResponse {
    pub message: String,
    #[serde(default, deserialize_with = "optional_lenient_string")]
    pub id: Option<String>,
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub message: String,
    pub remote_id: Option<String>,
}

impl SaveWorkoutResponse {
    /// The store answers some failures with a success status and a
    /// "Failed ..." message
    pub fn into_receipt(self) -> Result<SaveReceipt, ApiError> {
        if self.message.to_lowercase().contains("failed") {
            return Err(ApiError::Rejected(self.message));
        }
        Ok(SaveReceipt {
            message: self.message,
            remote_id: self.id,
        })
    }
}

/// Response to a workout listing request
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutsResponse {
    pub message: String,
    #[serde(default)]
    pub records: Option<Vec<WorkoutRecord>>,
}

impl WorkoutsResponse {
    pub fn is_empty_sentinel(&self) -> bool {
        self.message == NO_WORKOUTS_MESSAGE
    }

    pub fn into_listing(self) -> WorkoutListing {
        if self.is_empty_sentinel() {
            return WorkoutListing::NoWorkouts;
        }
        match self.records {
            Some(records) => WorkoutListing::Records(records),
            None => WorkoutListing::NoWorkouts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutListing {
    NoWorkouts,
    Records(Vec<WorkoutRecord>),
}

/// Stored workout as reported by the store; every field arrives as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkoutRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub distance: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string")]
    pub average_speed: String,
    #[serde(deserialize_with = "lenient_string")]
    pub calories_burned: String,
    pub start_location: String,
    pub end_location: String,
    pub created_at: String,
}

impl WorkoutRecord {
    /// Translate into a finished local workout.
    ///
    /// The store keeps no workout type, so records are read back as running.
    /// `created_at` is taken as the start time and the end time is derived
    /// from the duration. Duration and average speed are also written into
    /// the notes.
    pub fn into_workout(self) -> Result<Workout, ApiError> {
        let start_time = NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map_err(|e| {
                ApiError::InvalidResponse(format!(
                    "record {}: bad created_at {:?}: {}",
                    self.id, self.created_at, e
                ))
            })?
            .and_utc();

        let distance_km = parse_number(&self.id, "distance", &self.distance)?;
        let calories = parse_number(&self.id, "calories_burned", &self.calories_burned)?;
        let duration = parse_number(&self.id, "duration", &self.duration)?;
        let end_time = whole_seconds(duration)
            .and_then(|d| start_time.checked_add_signed(d))
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "record {}: duration {:?} out of range",
                    self.id, self.duration
                ))
            })?;

        Ok(Workout {
            notes: Some(format!(
                "Duration: {}s, Avg Speed: {} km/h",
                self.duration, self.average_speed
            )),
            id: self.id,
            workout_type: WorkoutType::Running,
            start_time,
            end_time: Some(end_time),
            distance_m: Some(distance_km * 1000.0),
            calories: Some(calories.round() as i32),
            heart_rate: None,
            route: Route::new(),
        })
    }
}

/// Non-negative, finite seconds that fit a `Duration`
fn whole_seconds(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds < 0.0 || seconds >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds.round() as i64)
}

fn parse_number(id: &str, field: &str, value: &str) -> Result<f64, ApiError> {
    value.trim().parse::<f64>().map_err(|_| {
        ApiError::InvalidResponse(format!("record {}: bad {} {:?}", id, field, value))
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
