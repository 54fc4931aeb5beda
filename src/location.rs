//! Seam between the workout session and whatever produces GPS fixes.
//!
//! A provider hands out a stream of [`LocationEvent`]s. The session consumes
//! one event at a time, in arrival order, until it drops the stream.

use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;

use crate::models::LocationSample;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location provider failed: {0}")]
    ProviderFailed(String),
}

pub type LocationEvent = Result<LocationSample, LocationError>;

/// Source of live position fixes
pub trait LocationProvider: Send + Sync {
    /// Begin delivering updates; dropping the stream stops them
    fn updates(&self) -> BoxStream<'static, LocationEvent>;
}

/// Provider that replays a fixed list of fixes, then ends
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    samples: Vec<LocationSample>,
}

impl ReplayProvider {
    pub fn new(samples: Vec<LocationSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl LocationProvider for ReplayProvider {
    fn updates(&self) -> BoxStream<'static, LocationEvent> {
        futures::stream::iter(self.samples.clone().into_iter().map(Ok)).boxed()
    }
}

/// Provider that never reports a fix
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn updates(&self) -> BoxStream<'static, LocationEvent> {
        futures::stream::pending().boxed()
    }
}
