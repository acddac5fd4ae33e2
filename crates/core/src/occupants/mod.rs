//! Dorm occupants.

pub mod types;

pub use types::{EnrollOccupantInput, Occupant, OccupantStatus};
