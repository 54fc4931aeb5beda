use serde::{Deserialize, Serialize};

use crate::models::{Route, WorkoutType};

/// Per-type values keyed by workout type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerType<T> {
    pub running: T,
    pub walking: T,
    pub cycling: T,
    pub swimming: T,
    pub other: T,
}

impl<T: Copy> PerType<T> {
    pub fn get(&self, workout_type: WorkoutType) -> T {
        match workout_type {
            WorkoutType::Running => self.running,
            WorkoutType::Walking => self.walking,
            WorkoutType::Cycling => self.cycling,
            WorkoutType::Swimming => self.swimming,
            WorkoutType::Other => self.other,
        }
    }
}

/// Calorie and heart-rate policy tables.
///
/// These are rough policy values rather than measured physiology; the defaults
/// must stay as they are so that estimates match what the workout server has
/// always received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityProfile {
    #[serde(default = "default_calories_per_km")]
    pub calories_per_km: PerType<f64>,

    #[serde(default = "default_heart_rate")]
    pub default_heart_rate: PerType<i32>,

    /// Mean speed (m/s) above which a workout counts as high intensity
    #[serde(default = "default_high_speed")]
    pub high_speed_mps: f64,

    /// Mean speed (m/s) above which a workout counts as medium intensity
    #[serde(default = "default_medium_speed")]
    pub medium_speed_mps: f64,

    #[serde(default = "default_high_bpm")]
    pub high_heart_rate: i32,

    #[serde(default = "default_medium_bpm")]
    pub medium_heart_rate: i32,

    #[serde(default = "default_low_bpm")]
    pub low_heart_rate: i32,
}

fn default_calories_per_km() -> PerType<f64> {
    PerType {
        running: 60.0,
        walking: 30.0,
        cycling: 25.0,
        swimming: 70.0,
        other: 40.0,
    }
}

fn default_heart_rate() -> PerType<i32> {
    PerType {
        running: 150,
        walking: 120,
        cycling: 130,
        swimming: 140,
        other: 125,
    }
}

fn default_high_speed() -> f64 {
    5.0
}

fn default_medium_speed() -> f64 {
    3.0
}

fn default_high_bpm() -> i32 {
    160
}

fn default_medium_bpm() -> i32 {
    140
}

fn default_low_bpm() -> i32 {
    120
}

impl Default for IntensityProfile {
    fn default() -> Self {
        Self {
            calories_per_km: default_calories_per_km(),
            default_heart_rate: default_heart_rate(),
            high_speed_mps: default_high_speed(),
            medium_speed_mps: default_medium_speed(),
            high_heart_rate: default_high_bpm(),
            medium_heart_rate: default_medium_bpm(),
            low_heart_rate: default_low_bpm(),
        }
    }
}

/// Derives calorie and heart-rate estimates from distance and motion
#[derive(Debug, Clone, Default)]
pub struct IntensityEstimator {
    profile: IntensityProfile,
}

impl IntensityEstimator {
    pub fn new(profile: IntensityProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &IntensityProfile {
        &self.profile
    }

    /// Calories burned over `distance_m` meters, rounded half-up
    pub fn calories_for_distance(&self, distance_m: f64, workout_type: WorkoutType) -> i32 {
        let distance_km = distance_m / 1000.0;
        let calories = distance_km * self.profile.calories_per_km.get(workout_type);
        (calories + 0.5).floor() as i32
    }

    /// Average heart rate estimate, bucketed by mean recorded speed
    pub fn estimate_heart_rate(&self, route: &Route, workout_type: WorkoutType) -> i32 {
        match route.mean_speed() {
            Some(speed) if speed > self.profile.high_speed_mps => self.profile.high_heart_rate,
            Some(speed) if speed > self.profile.medium_speed_mps => {
                self.profile.medium_heart_rate
            }
            Some(_) => self.profile.low_heart_rate,
            None => self.profile.default_heart_rate.get(workout_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationSample;
    use chrono::Utc;
    use proptest::prelude::*;

    fn route_with_speeds(speeds: &[Option<f64>]) -> Route {
        let now = Utc::now();
        speeds
            .iter()
            .map(|speed| {
                let sample = LocationSample::new(16.84, 96.17, now);
                match speed {
                    Some(s) => sample.with_speed(*s),
                    None => sample,
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_calories_per_type() {
        let estimator = IntensityEstimator::default();
        assert_eq!(estimator.calories_for_distance(1000.0, WorkoutType::Running), 60);
        assert_eq!(estimator.calories_for_distance(1000.0, WorkoutType::Walking), 30);
        assert_eq!(estimator.calories_for_distance(1000.0, WorkoutType::Cycling), 25);
        assert_eq!(estimator.calories_for_distance(1000.0, WorkoutType::Swimming), 70);
        assert_eq!(estimator.calories_for_distance(1000.0, WorkoutType::Other), 40);
        assert_eq!(estimator.calories_for_distance(0.0, WorkoutType::Running), 0);
    }

    #[test]
    fn test_calories_round_half_up() {
        let estimator = IntensityEstimator::default();
        // 6.25 kcal
        assert_eq!(estimator.calories_for_distance(250.0, WorkoutType::Cycling), 6);
        assert_eq!(estimator.calories_for_distance(500.0, WorkoutType::Walking), 15);
        // 2.5 kcal
        assert_eq!(estimator.calories_for_distance(62.5, WorkoutType::Other), 3);
        assert_eq!(estimator.calories_for_distance(217.62, WorkoutType::Running), 13);
    }

    #[test]
    fn test_heart_rate_buckets() {
        let estimator = IntensityEstimator::default();
        let fast = route_with_speeds(&[Some(6.0), Some(5.5)]);
        let medium = route_with_speeds(&[Some(4.0), None, Some(3.5)]);
        let slow = route_with_speeds(&[Some(1.2)]);

        assert_eq!(estimator.estimate_heart_rate(&fast, WorkoutType::Walking), 160);
        assert_eq!(estimator.estimate_heart_rate(&medium, WorkoutType::Walking), 140);
        assert_eq!(estimator.estimate_heart_rate(&slow, WorkoutType::Running), 120);
    }

    #[test]
    fn test_heart_rate_boundaries_are_strict() {
        let estimator = IntensityEstimator::default();
        let at_high = route_with_speeds(&[Some(5.0), Some(5.0)]);
        let at_medium = route_with_speeds(&[Some(3.0)]);

        assert_eq!(estimator.estimate_heart_rate(&at_high, WorkoutType::Running), 140);
        assert_eq!(estimator.estimate_heart_rate(&at_medium, WorkoutType::Running), 120);
    }

    #[test]
    fn test_heart_rate_defaults_without_speed() {
        let estimator = IntensityEstimator::default();
        let no_speed = route_with_speeds(&[None, None]);
        let empty = Route::new();

        assert_eq!(estimator.estimate_heart_rate(&no_speed, WorkoutType::Running), 150);
        assert_eq!(estimator.estimate_heart_rate(&empty, WorkoutType::Walking), 120);
        assert_eq!(estimator.estimate_heart_rate(&empty, WorkoutType::Cycling), 130);
        assert_eq!(estimator.estimate_heart_rate(&empty, WorkoutType::Swimming), 140);
        assert_eq!(estimator.estimate_heart_rate(&empty, WorkoutType::Other), 125);
    }

    #[test]
    fn test_custom_profile() {
        let profile = IntensityProfile {
            calories_per_km: PerType {
                running: 100.0,
                ..default_calories_per_km()
            },
            ..IntensityProfile::default()
        };
        let estimator = IntensityEstimator::new(profile);
        assert_eq!(estimator.calories_for_distance(2000.0, WorkoutType::Running), 200);
    }

    proptest! {
        #[test]
        fn prop_calories_non_decreasing(
            a in 0.0f64..100_000.0,
            b in 0.0f64..100_000.0,
            idx in 0usize..5,
        ) {
            let estimator = IntensityEstimator::default();
            let workout_type = WorkoutType::ALL[idx];
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                estimator.calories_for_distance(lo, workout_type)
                    <= estimator.calories_for_distance(hi, workout_type)
            );
        }
    }
}
