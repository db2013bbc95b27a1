//! Shared types for the booking processing system.

pub mod types;

pub use types::{BookingId, Reference};
