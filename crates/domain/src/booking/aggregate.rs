//! Booking aggregate implementation.

use std::sync::RwLock;

use common::{BookingId, Reference};

use super::{BookingError, Iban, Money, ProcessingState, Stay, TaxNumber};

/// The saga-visible part of a booking: processing state plus the two
/// write-once references accumulated along the way.
///
/// A state transition and its reference assignment commit under one write
/// guard, so no half-written step is ever observable.
#[derive(Debug, Default)]
struct SagaCell {
    state: ProcessingState,
    payment_reference: Option<Reference>,
    invoice_reference: Option<Reference>,
}

/// A hotel room reservation and its saga state.
///
/// The booking is created by the room that owns it and shared with the
/// processor as `Arc<Booking>`. All state transitions happen inside the
/// processor; everyone else observes progress through [`Booking::state`].
#[derive(Debug)]
pub struct Booking {
    id: BookingId,
    room_number: String,
    stay: Stay,
    buyer_nif: TaxNumber,
    buyer_iban: Iban,
    price: Money,
    cell: RwLock<SagaCell>,
}

impl Booking {
    /// Creates a new booking in the `Created` state.
    pub fn new(
        room_number: impl Into<String>,
        stay: Stay,
        buyer_nif: TaxNumber,
        buyer_iban: Iban,
        price: Money,
    ) -> Self {
        Self {
            id: BookingId::new(),
            room_number: room_number.into(),
            stay,
            buyer_nif,
            buyer_iban,
            price,
            cell: RwLock::new(SagaCell::default()),
        }
    }

    /// Returns the booking ID.
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// Returns the number of the room this booking belongs to.
    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    /// Returns the stay dates.
    pub fn stay(&self) -> Stay {
        self.stay
    }

    /// Returns the buyer's tax number.
    pub fn buyer_nif(&self) -> &TaxNumber {
        &self.buyer_nif
    }

    /// Returns the buyer's bank account.
    pub fn buyer_iban(&self) -> &Iban {
        &self.buyer_iban
    }

    /// Returns the booking price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns the current processing state.
    pub fn state(&self) -> ProcessingState {
        self.cell.read().unwrap().state
    }

    /// Returns the payment reference, if one has been obtained.
    pub fn payment_reference(&self) -> Option<Reference> {
        self.cell.read().unwrap().payment_reference.clone()
    }

    /// Returns the invoice reference, if one has been obtained.
    pub fn invoice_reference(&self) -> Option<Reference> {
        self.cell.read().unwrap().invoice_reference.clone()
    }
}

// Transition methods, driven exclusively by the processor.
impl Booking {
    /// Marks a freshly created booking as awaiting payment capture.
    pub fn mark_payment_pending(&self) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if cell.state != ProcessingState::Created {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "submit",
            });
        }
        cell.state = ProcessingState::PaymentPending;
        Ok(())
    }

    /// Records a captured payment and moves the booking to `Paid`.
    pub fn record_payment(&self, reference: Reference) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if !cell.state.awaiting_charge() {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "record a payment",
            });
        }
        if cell.payment_reference.is_some() {
            return Err(BookingError::PaymentReferenceSet);
        }
        cell.payment_reference = Some(reference);
        cell.state = ProcessingState::Paid;
        Ok(())
    }

    /// Records an issued invoice and moves the booking to `Confirmed`.
    pub fn record_invoice(&self, reference: Reference) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if !cell.state.awaiting_invoice() {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "record an invoice",
            });
        }
        if cell.invoice_reference.is_some() {
            return Err(BookingError::InvoiceReferenceSet);
        }
        cell.invoice_reference = Some(reference);
        cell.state = ProcessingState::Confirmed;
        Ok(())
    }

    /// Starts the compensation path for a confirmed booking.
    pub fn begin_cancellation(&self) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if !cell.state.can_cancel() {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "cancel",
            });
        }
        cell.state = ProcessingState::CancelPaymentPending;
        Ok(())
    }

    /// Records the payment reversal and moves the booking to `PaymentCancelled`.
    pub fn record_payment_cancelled(&self) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if !cell.state.awaiting_payment_cancel() {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "record a payment reversal",
            });
        }
        cell.state = ProcessingState::PaymentCancelled;
        Ok(())
    }

    /// Records the invoice cancellation and moves the booking to `Cancelled`.
    pub fn record_invoice_cancelled(&self) -> Result<(), BookingError> {
        let mut cell = self.cell.write().unwrap();
        if !cell.state.awaiting_invoice_cancel() {
            return Err(BookingError::InvalidTransition {
                state: cell.state,
                action: "record an invoice cancellation",
            });
        }
        cell.state = ProcessingState::Cancelled;
        Ok(())
    }
}
