pub mod sample;
pub mod workout;

pub use sample::{Coordinate, LocationSample, Route};
pub use workout::{Credentials, Workout, WorkoutTotals, WorkoutType};
