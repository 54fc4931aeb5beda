use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Route;

/// Kind of activity being recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    #[default]
    Running,
    Walking,
    Cycling,
    Swimming,
    Other,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 5] = [
        WorkoutType::Running,
        WorkoutType::Walking,
        WorkoutType::Cycling,
        WorkoutType::Swimming,
        WorkoutType::Other,
    ];
}

impl std::fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutType::Running => write!(f, "Running"),
            WorkoutType::Walking => write!(f, "Walking"),
            WorkoutType::Cycling => write!(f, "Cycling"),
            WorkoutType::Swimming => write!(f, "Swimming"),
            WorkoutType::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for WorkoutType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" | "run" => Ok(WorkoutType::Running),
            "walking" | "walk" => Ok(WorkoutType::Walking),
            "cycling" | "bike" => Ok(WorkoutType::Cycling),
            "swimming" | "swim" => Ok(WorkoutType::Swimming),
            "other" => Ok(WorkoutType::Other),
            _ => Err(anyhow::anyhow!("Invalid workout type: {}", s)),
        }
    }
}

/// Metrics computed when a workout is finalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutTotals {
    pub distance_m: f64,
    pub calories: i32,
    pub heart_rate: i32,
}

/// Workout record, active while `end_time` is unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub workout_type: WorkoutType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Distance in meters
    pub distance_m: Option<f64>,
    pub calories: Option<i32>,
    /// Average heart rate in bpm
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub route: Route,
}

impl Workout {
    /// Create a new active workout with a generated ID
    pub fn start(workout_type: WorkoutType, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workout_type,
            start_time,
            end_time: None,
            distance_m: None,
            calories: None,
            heart_rate: None,
            notes: None,
            route: Route::new(),
        }
    }

    /// Close the workout, filling in the final metrics and route
    pub fn finalize(
        self,
        end_time: DateTime<Utc>,
        totals: WorkoutTotals,
        notes: Option<String>,
        route: Route,
    ) -> Self {
        Self {
            end_time: Some(end_time),
            distance_m: Some(totals.distance_m),
            calories: Some(totals.calories),
            heart_rate: Some(totals.heart_rate),
            notes,
            route,
            ..self
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whole seconds between start and end, 0 while active
    pub fn duration_seconds(&self) -> i64 {
        match self.end_time {
            Some(end) => (end - self.start_time).num_seconds().max(0),
            None => 0,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m.unwrap_or(0.0) / 1000.0
    }

    /// Average speed in km/h, 0 when the duration is zero
    pub fn average_speed_kmh(&self) -> f64 {
        let hours = self.duration_seconds() as f64 / 3600.0;
        if hours > 0.0 {
            self.distance_km() / hours
        } else {
            0.0
        }
    }
}

/// Opaque identity handed over by the auth service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    pub token: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_workout_start() {
        let now = Utc::now();
        let workout = Workout::start(WorkoutType::Cycling, now);

        assert!(workout.is_active());
        assert!(!workout.id.is_empty());
        assert_eq!(workout.workout_type, WorkoutType::Cycling);
        assert_eq!(workout.start_time, now);
        assert_eq!(workout.duration_seconds(), 0);
        assert_eq!(workout.average_speed_kmh(), 0.0);
    }

    #[test]
    fn test_workout_ids_are_unique() {
        let now = Utc::now();
        let a = Workout::start(WorkoutType::Running, now);
        let b = Workout::start(WorkoutType::Running, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_finalize_sets_metrics() {
        let start = Utc::now();
        let workout = Workout::start(WorkoutType::Running, start);
        let id = workout.id.clone();

        let finished = workout.finalize(
            start + Duration::seconds(1800),
            WorkoutTotals {
                distance_m: 5000.0,
                calories: 300,
                heart_rate: 150,
            },
            Some("Tempo run".to_string()),
            Route::new(),
        );

        assert_eq!(finished.id, id);
        assert!(!finished.is_active());
        assert_eq!(finished.duration_seconds(), 1800);
        assert_eq!(finished.distance_km(), 5.0);
        assert!((finished.average_speed_kmh() - 10.0).abs() < 1e-9);
        assert_eq!(finished.calories, Some(300));
        assert_eq!(finished.notes.as_deref(), Some("Tempo run"));
    }

    #[test]
    fn test_workout_type_parsing() {
        assert_eq!("Running".parse::<WorkoutType>().unwrap(), WorkoutType::Running);
        assert_eq!("swim".parse::<WorkoutType>().unwrap(), WorkoutType::Swimming);
        assert!("rowing".parse::<WorkoutType>().is_err());
        assert_eq!(WorkoutType::default(), WorkoutType::Running);
    }
}
