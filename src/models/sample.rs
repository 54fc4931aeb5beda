use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo;

/// A point on the earth's surface in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A single GPS fix reported by the location provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Instantaneous speed in meters per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Altitude in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            speed: None,
            altitude: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Ordered sequence of fixes making up a workout route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<LocationSample>);

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[LocationSample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&LocationSample> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&LocationSample> {
        self.0.last()
    }

    pub(crate) fn push(&mut self, sample: LocationSample) {
        self.0.push(sample);
    }

    /// Sum of consecutive-pair distances, recomputed from scratch
    pub fn total_distance_m(&self) -> f64 {
        self.0
            .windows(2)
            .map(|pair| geo::distance_meters(pair[0].coordinate(), pair[1].coordinate()))
            .sum()
    }

    /// Mean of all recorded speeds, `None` when no fix carries a speed
    pub fn mean_speed(&self) -> Option<f64> {
        let speeds: Vec<f64> = self.0.iter().filter_map(|s| s.speed).collect();
        if speeds.is_empty() {
            return None;
        }
        Some(speeds.iter().sum::<f64>() / speeds.len() as f64)
    }
}

impl From<Vec<LocationSample>> for Route {
    fn from(samples: Vec<LocationSample>) -> Self {
        Self(samples)
    }
}
