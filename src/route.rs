use crate::error::TrackerError;
use crate::geo;
use crate::models::{LocationSample, Route};

/// Growing route of the active workout with a running distance total.
///
/// Samples are kept in arrival order. When `reject_out_of_order` is set, a
/// sample stamped earlier than the previous one is refused with
/// [`TrackerError::SampleOutOfOrder`] and leaves the route untouched; equal
/// timestamps are accepted. With the flag cleared every sample is trusted.
#[derive(Debug, Clone)]
pub struct RouteAccumulator {
    route: Route,
    total_distance_m: f64,
    reject_out_of_order: bool,
}

impl Default for RouteAccumulator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RouteAccumulator {
    pub fn new(reject_out_of_order: bool) -> Self {
        Self {
            route: Route::new(),
            total_distance_m: 0.0,
            reject_out_of_order,
        }
    }

    pub fn append(&mut self, sample: LocationSample) -> Result<(), TrackerError> {
        if let Some(last) = self.route.last() {
            if self.reject_out_of_order && sample.timestamp < last.timestamp {
                return Err(TrackerError::SampleOutOfOrder {
                    previous: last.timestamp,
                    received: sample.timestamp,
                });
            }
            self.total_distance_m += geo::distance_meters(last.coordinate(), sample.coordinate());
        }

        self.route.push(sample);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.route = Route::new();
        self.total_distance_m = 0.0;
    }

    /// Hand over the collected route and start again from empty
    pub fn take(&mut self) -> (Route, f64) {
        let route = std::mem::take(&mut self.route);
        let total = std::mem::replace(&mut self.total_distance_m, 0.0);
        (route, total)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    pub fn last_sample(&self) -> Option<&LocationSample> {
        self.route.last()
    }
}
