//! Booking saga state machine.

use serde::{Deserialize, Serialize};

/// The processing state of a booking in its saga lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► PaymentPending ──► Paid ──► InvoicePending ──► Confirmed
///                                                                │
///                     ┌──────────────────────────────────────────┘
///                     ▼
///          CancelPaymentPending ──► PaymentCancelled ──► CancelInvoicePending ──► Cancelled
/// ```
///
/// A failed remote attempt leaves the booking in its pre-attempt state, so
/// the invoice step accepts both `Paid` and `InvoicePending`, and the
/// invoice-cancel step accepts both `PaymentCancelled` and
/// `CancelInvoicePending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessingState {
    /// Booking created, not yet submitted for processing.
    #[default]
    Created,

    /// Submitted, awaiting payment capture.
    PaymentPending,

    /// Payment captured, awaiting invoice submission.
    Paid,

    /// Invoice submission in progress.
    InvoicePending,

    /// Payment captured and invoice issued.
    Confirmed,

    /// Cancellation requested, awaiting payment reversal.
    CancelPaymentPending,

    /// Payment reversed, awaiting invoice cancellation.
    PaymentCancelled,

    /// Invoice cancellation in progress.
    CancelInvoicePending,

    /// Both side effects compensated (terminal state).
    Cancelled,
}

impl ProcessingState {
    /// Returns true if the next forward step is the payment capture.
    pub fn awaiting_charge(&self) -> bool {
        matches!(self, ProcessingState::PaymentPending)
    }

    /// Returns true if the next forward step is the invoice submission.
    pub fn awaiting_invoice(&self) -> bool {
        matches!(self, ProcessingState::Paid | ProcessingState::InvoicePending)
    }

    /// Returns true if the next compensation step is the payment reversal.
    pub fn awaiting_payment_cancel(&self) -> bool {
        matches!(self, ProcessingState::CancelPaymentPending)
    }

    /// Returns true if the next compensation step is the invoice cancellation.
    pub fn awaiting_invoice_cancel(&self) -> bool {
        matches!(
            self,
            ProcessingState::PaymentCancelled | ProcessingState::CancelInvoicePending
        )
    }

    /// Returns true if the booking can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, ProcessingState::Confirmed)
    }

    /// Returns true if a drain pass has work to do for this state.
    pub fn has_pending_work(&self) -> bool {
        self.awaiting_charge()
            || self.awaiting_invoice()
            || self.awaiting_payment_cancel()
            || self.awaiting_invoice_cancel()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingState::Cancelled)
    }

    /// Returns true if a payment reference must be set in this state.
    pub fn requires_payment_reference(&self) -> bool {
        !matches!(
            self,
            ProcessingState::Created | ProcessingState::PaymentPending
        )
    }

    /// Returns true if an invoice reference must be set in this state.
    pub fn requires_invoice_reference(&self) -> bool {
        matches!(
            self,
            ProcessingState::Confirmed
                | ProcessingState::CancelPaymentPending
                | ProcessingState::PaymentCancelled
                | ProcessingState::CancelInvoicePending
                | ProcessingState::Cancelled
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Created => "Created",
            ProcessingState::PaymentPending => "PaymentPending",
            ProcessingState::Paid => "Paid",
            ProcessingState::InvoicePending => "InvoicePending",
            ProcessingState::Confirmed => "Confirmed",
            ProcessingState::CancelPaymentPending => "CancelPaymentPending",
            ProcessingState::PaymentCancelled => "PaymentCancelled",
            ProcessingState::CancelInvoicePending => "CancelInvoicePending",
            ProcessingState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ProcessingState; 9] = [
        ProcessingState::Created,
        ProcessingState::PaymentPending,
        ProcessingState::Paid,
        ProcessingState::InvoicePending,
        ProcessingState::Confirmed,
        ProcessingState::CancelPaymentPending,
        ProcessingState::PaymentCancelled,
        ProcessingState::CancelInvoicePending,
        ProcessingState::Cancelled,
    ];

    #[test]
    fn test_default_state_is_created() {
        assert_eq!(ProcessingState::default(), ProcessingState::Created);
    }

    #[test]
    fn test_awaiting_charge() {
        for state in ALL {
            assert_eq!(
                state.awaiting_charge(),
                state == ProcessingState::PaymentPending
            );
        }
    }

    #[test]
    fn test_awaiting_invoice() {
        assert!(ProcessingState::Paid.awaiting_invoice());
        assert!(ProcessingState::InvoicePending.awaiting_invoice());
        assert!(!ProcessingState::PaymentPending.awaiting_invoice());
        assert!(!ProcessingState::Confirmed.awaiting_invoice());
    }

    #[test]
    fn test_awaiting_invoice_cancel() {
        assert!(ProcessingState::PaymentCancelled.awaiting_invoice_cancel());
        assert!(ProcessingState::CancelInvoicePending.awaiting_invoice_cancel());
        assert!(!ProcessingState::CancelPaymentPending.awaiting_invoice_cancel());
        assert!(!ProcessingState::Cancelled.awaiting_invoice_cancel());
    }

    #[test]
    fn test_only_confirmed_can_cancel() {
        for state in ALL {
            assert_eq!(state.can_cancel(), state == ProcessingState::Confirmed);
        }
    }

    #[test]
    fn test_pending_work() {
        for state in ALL {
            let idle = matches!(
                state,
                ProcessingState::Created | ProcessingState::Confirmed | ProcessingState::Cancelled
            );
            assert_eq!(state.has_pending_work(), !idle);
        }
    }

    #[test]
    fn test_terminal_states() {
        for state in ALL {
            assert_eq!(state.is_terminal(), state == ProcessingState::Cancelled);
        }
    }

    #[test]
    fn test_payment_reference_requirement() {
        assert!(!ProcessingState::Created.requires_payment_reference());
        assert!(!ProcessingState::PaymentPending.requires_payment_reference());
        assert!(ProcessingState::Paid.requires_payment_reference());
        assert!(ProcessingState::Confirmed.requires_payment_reference());
        assert!(ProcessingState::Cancelled.requires_payment_reference());
    }

    #[test]
    fn test_invoice_reference_requirement() {
        assert!(!ProcessingState::Paid.requires_invoice_reference());
        assert!(!ProcessingState::InvoicePending.requires_invoice_reference());
        assert!(ProcessingState::Confirmed.requires_invoice_reference());
        assert!(ProcessingState::PaymentCancelled.requires_invoice_reference());
        assert!(ProcessingState::Cancelled.requires_invoice_reference());
    }

    #[test]
    fn test_display() {
        assert_eq!(ProcessingState::Created.to_string(), "Created");
        assert_eq!(
            ProcessingState::CancelPaymentPending.to_string(),
            "CancelPaymentPending"
        );
    }

    #[test]
    fn test_serialization() {
        let state = ProcessingState::Paid;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ProcessingState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
