//! Processor error types.

use common::BookingId;
use domain::{BookingError, ProcessingState};
use thiserror::Error;

/// Errors returned by a remote service call.
///
/// Both kinds are absorbed by the drain and retried on the next entry-point
/// invocation; rejections are requeued exactly like transient failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Network or remote-access failure, safe to retry blindly.
    #[error("Remote access failure: {0}")]
    Transient(String),

    /// Business-level refusal (e.g. insufficient funds, invalid tax id).
    #[error("Operation rejected: {0}")]
    Rejection(String),
}

/// Errors surfaced by the processor to its callers.
///
/// Remote failures never cross the processor boundary; callers observe
/// progress only by inspecting a booking's state.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The booking is in the wrong state for the requested operation.
    #[error("Booking {id} cannot be cancelled from {state} state")]
    InvalidState {
        id: BookingId,
        state: ProcessingState,
    },

    /// A booking invariant was violated. Unreachable in correct use.
    #[error("Booking invariant violated: {0}")]
    Invariant(#[from] BookingError),
}

/// Convenience type alias for processor results.
pub type Result<T> = std::result::Result<T, ProcessorError>;
