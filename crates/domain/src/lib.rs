//! Booking domain for the hotel reservation system.
//!
//! This crate provides the core domain types:
//! - Booking aggregate with its saga processing state machine
//! - Hotel and Room entities
//! - Value objects for money, stays, and billing identities

pub mod booking;
pub mod hotel;
pub mod room;

pub use booking::{
    Booking, BookingError, Iban, Money, ProcessingState, RoomType, Stay, TaxNumber,
};
pub use hotel::Hotel;
pub use room::Room;
