//! Booking aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::Booking;
pub use state::ProcessingState;
pub use value_objects::{Iban, Money, RoomType, Stay, TaxNumber};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Arrival date must precede departure date.
    #[error("Invalid stay: arrival {arrival} is not before departure {departure}")]
    InvalidStay {
        arrival: NaiveDate,
        departure: NaiveDate,
    },

    /// Booking is not in the expected state.
    #[error("Invalid transition: cannot {action} from {state} state")]
    InvalidTransition {
        state: ProcessingState,
        action: &'static str,
    },

    /// A payment reference was already recorded for this booking.
    #[error("Payment reference already recorded")]
    PaymentReferenceSet,

    /// An invoice reference was already recorded for this booking.
    #[error("Invoice reference already recorded")]
    InvoiceReferenceSet,

    /// A reference required by the current state is missing.
    #[error("No {kind} reference available in {state} state")]
    MissingReference {
        kind: &'static str,
        state: ProcessingState,
    },
}
