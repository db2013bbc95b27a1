//! Booking processor orchestrating the payment and invoicing saga.

use std::sync::Arc;

use domain::{Booking, BookingError, Hotel, Iban, ProcessingState, TaxNumber};
use tokio::sync::Mutex;

use crate::error::{ProcessorError, ServiceError};
use crate::services::{ChargeRequest, InvoiceRequest, RemoteService};

/// Outcome of one advancement attempt for a pending booking.
enum StepOutcome {
    /// The step committed and the booking has a further step to attempt.
    Advanced,

    /// The remote call failed; the booking keeps its state and stays queued.
    StillPending,

    /// The booking reached a resting state and leaves the queue.
    Settled,
}

/// Drives bookings through their saga state machine.
///
/// Forward path: capture the payment at the bank, then issue the invoice at
/// the tax authority. Compensation path: reverse the payment, then cancel
/// the invoice. Each entry point performs one synchronous drain pass over
/// the pending queue in FIFO insertion order; a booking whose step fails
/// keeps its state and is retried on the next pass, which may be triggered
/// by submitting or cancelling any booking, including an unrelated one.
pub struct Processor<B, T>
where
    B: RemoteService<Request = ChargeRequest>,
    T: RemoteService<Request = InvoiceRequest>,
{
    hotel_iban: Iban,
    hotel_nif: TaxNumber,
    bank: B,
    tax: T,
    /// Bookings not yet fully advanced, in insertion order, deduplicated by
    /// booking id. Held for the whole drain pass so at most one pass
    /// advances a given booking at a time.
    pending: Mutex<Vec<Arc<Booking>>>,
}

impl<B, T> Processor<B, T>
where
    B: RemoteService<Request = ChargeRequest>,
    T: RemoteService<Request = InvoiceRequest>,
{
    /// Creates a processor for the given hotel, copying its billing
    /// identity. A hotel and its processor are created as a pair.
    pub fn new(hotel: &Hotel, bank: B, tax: T) -> Self {
        Self {
            hotel_iban: hotel.iban().clone(),
            hotel_nif: hotel.nif().clone(),
            bank,
            tax,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Submits a booking for processing.
    ///
    /// A `Created` booking is marked `PaymentPending` and queued; then one
    /// drain pass runs over everything currently pending. Remote failures
    /// are absorbed, and calling this again (with any booking) is the only
    /// retry mechanism. The only possible error is an invariant violation,
    /// which indicates a bug.
    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id()))]
    pub async fn submit_booking(&self, booking: &Arc<Booking>) -> Result<(), ProcessorError> {
        metrics::counter!("booking_submissions_total").increment(1);
        let mut pending = self.pending.lock().await;

        if booking.state() == ProcessingState::Created {
            booking.mark_payment_pending()?;
            Self::enqueue(&mut pending, booking);
            tracing::info!("booking queued for payment");
        }

        self.drain(&mut pending).await
    }

    /// Cancels a confirmed booking, starting the compensation path.
    ///
    /// Fails with [`ProcessorError::InvalidState`], without issuing any
    /// remote call, if the booking is not `Confirmed`. On success the
    /// booking is marked `CancelPaymentPending`, queued, and a drain pass
    /// runs.
    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id()))]
    pub async fn cancel_booking(&self, booking: &Arc<Booking>) -> Result<(), ProcessorError> {
        metrics::counter!("booking_cancellations_total").increment(1);
        let mut pending = self.pending.lock().await;

        let state = booking.state();
        if !state.can_cancel() {
            return Err(ProcessorError::InvalidState {
                id: booking.id(),
                state,
            });
        }
        booking.begin_cancellation()?;
        Self::enqueue(&mut pending, booking);
        tracing::info!("booking queued for cancellation");

        self.drain(&mut pending).await
    }

    /// Returns the number of bookings currently pending.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn enqueue(pending: &mut Vec<Arc<Booking>>, booking: &Arc<Booking>) {
        if !pending.iter().any(|b| b.id() == booking.id()) {
            pending.push(Arc::clone(booking));
        }
    }

    /// One drain pass: for every pending booking in FIFO order, attempt its
    /// next step, cascading to the following step while attempts succeed.
    /// A booking that reaches `Confirmed` or `Cancelled` leaves the queue.
    async fn drain(&self, pending: &mut Vec<Arc<Booking>>) -> Result<(), ProcessorError> {
        let queue: Vec<Arc<Booking>> = pending.clone();
        for booking in queue {
            loop {
                match self.advance(&booking).await? {
                    StepOutcome::Advanced => continue,
                    StepOutcome::StillPending => break,
                    StepOutcome::Settled => {
                        pending.retain(|b| b.id() != booking.id());
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Attempts exactly one step for the booking. A failed remote call
    /// leaves state and references untouched.
    async fn advance(&self, booking: &Arc<Booking>) -> Result<StepOutcome, ProcessorError> {
        let state = booking.state();

        if state.awaiting_charge() {
            let request = ChargeRequest {
                amount: booking.price(),
                buyer_iban: booking.buyer_iban().clone(),
                hotel_iban: self.hotel_iban.clone(),
            };
            match self.bank.perform(&request).await {
                Ok(reference) => {
                    booking.record_payment(reference)?;
                    tracing::info!(booking_id = %booking.id(), "payment captured");
                    Ok(StepOutcome::Advanced)
                }
                Err(error) => Ok(Self::absorb(booking, "charge", error)),
            }
        } else if state.awaiting_invoice() {
            let stay = booking.stay();
            let request = InvoiceRequest {
                buyer_nif: booking.buyer_nif().clone(),
                hotel_nif: self.hotel_nif.clone(),
                amount: booking.price(),
                arrival: stay.arrival(),
                departure: stay.departure(),
            };
            match self.tax.perform(&request).await {
                Ok(reference) => {
                    booking.record_invoice(reference)?;
                    metrics::counter!("bookings_confirmed").increment(1);
                    tracing::info!(booking_id = %booking.id(), "booking confirmed");
                    Ok(StepOutcome::Settled)
                }
                Err(error) => Ok(Self::absorb(booking, "invoice", error)),
            }
        } else if state.awaiting_payment_cancel() {
            let reference =
                booking
                    .payment_reference()
                    .ok_or(BookingError::MissingReference {
                        kind: "payment",
                        state,
                    })?;
            match self.bank.cancel(&reference).await {
                Ok(()) => {
                    booking.record_payment_cancelled()?;
                    tracing::info!(booking_id = %booking.id(), "payment reversed");
                    Ok(StepOutcome::Advanced)
                }
                Err(error) => Ok(Self::absorb(booking, "cancel payment", error)),
            }
        } else if state.awaiting_invoice_cancel() {
            let reference =
                booking
                    .invoice_reference()
                    .ok_or(BookingError::MissingReference {
                        kind: "invoice",
                        state,
                    })?;
            match self.tax.cancel(&reference).await {
                Ok(()) => {
                    booking.record_invoice_cancelled()?;
                    metrics::counter!("bookings_cancelled").increment(1);
                    tracing::info!(booking_id = %booking.id(), "booking cancelled");
                    Ok(StepOutcome::Settled)
                }
                Err(error) => Ok(Self::absorb(booking, "cancel invoice", error)),
            }
        } else {
            // Created, Confirmed, or Cancelled: nothing to attempt.
            Ok(StepOutcome::Settled)
        }
    }

    /// Absorbs a remote failure: the booking keeps its pre-attempt state
    /// and stays queued for the next drain pass.
    fn absorb(booking: &Booking, step: &'static str, error: ServiceError) -> StepOutcome {
        metrics::counter!("remote_call_failures_total").increment(1);
        tracing::warn!(
            booking_id = %booking.id(),
            step,
            %error,
            "remote call failed, booking stays queued"
        );
        StepOutcome::StillPending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryBank, InMemoryTax};
    use chrono::NaiveDate;
    use domain::{Money, RoomType, Stay};

    fn hotel() -> Hotel {
        Hotel::new(
            "XPTO123",
            "Lisboa",
            TaxNumber::new("123456700"),
            Iban::new("IBAN_HOTEL"),
            Money::from_euros(20),
            Money::from_euros(30),
        )
    }

    fn setup() -> (Processor<InMemoryBank, InMemoryTax>, InMemoryBank, InMemoryTax) {
        let bank = InMemoryBank::new();
        let tax = InMemoryTax::new();
        let processor = Processor::new(&hotel(), bank.clone(), tax.clone());
        (processor, bank, tax)
    }

    fn booking_for(buyer_iban: &str) -> Arc<Booking> {
        let stay = Stay::new(
            NaiveDate::from_ymd_opt(2026, 12, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        )
        .unwrap();
        Arc::new(Booking::new(
            "01",
            stay,
            TaxNumber::new("123456789"),
            Iban::new(buyer_iban),
            hotel().rate_for(RoomType::Single).multiply(stay.nights()),
        ))
    }

    #[tokio::test]
    async fn test_single_pass_confirms_when_both_calls_succeed() {
        let (processor, bank, tax) = setup();
        let booking = booking_for("IBAN_BUYER");

        processor.submit_booking(&booking).await.unwrap();

        assert_eq!(booking.state(), ProcessingState::Confirmed);
        assert!(booking.payment_reference().is_some());
        assert!(booking.invoice_reference().is_some());
        assert_eq!(bank.charge_attempt_count(), 1);
        assert_eq!(tax.invoice_attempt_count(), 1);
        assert_eq!(processor.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_charge_amount_and_accounts() {
        let (processor, bank, _tax) = setup();
        let booking = booking_for("IBAN_BUYER");

        processor.submit_booking(&booking).await.unwrap();

        // 5 nights at €20, charged from the buyer's account
        let attempts = bank.charge_attempts();
        assert_eq!(attempts, vec![Iban::new("IBAN_BUYER")]);
        assert_eq!(booking.price(), Money::from_euros(100));
    }

    #[tokio::test]
    async fn test_drain_attempts_in_fifo_order() {
        let (processor, bank, _tax) = setup();
        bank.set_fail_on_charge(Some(ServiceError::Transient("down".into())));

        let a = booking_for("IBAN_A");
        let b = booking_for("IBAN_B");
        processor.submit_booking(&a).await.unwrap();
        processor.submit_booking(&b).await.unwrap();

        bank.set_fail_on_charge(None);
        let c = booking_for("IBAN_C");
        processor.submit_booking(&c).await.unwrap();

        // Last pass retried a, then b, then processed c
        let attempts = bank.charge_attempts();
        let last_three: Vec<&str> = attempts[attempts.len() - 3..]
            .iter()
            .map(|i| i.as_str())
            .collect();
        assert_eq!(last_three, vec!["IBAN_A", "IBAN_B", "IBAN_C"]);
        assert_eq!(processor.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_confirmed_booking_is_noop() {
        let (processor, bank, tax) = setup();
        let booking = booking_for("IBAN_BUYER");
        processor.submit_booking(&booking).await.unwrap();

        processor.submit_booking(&booking).await.unwrap();

        assert_eq!(booking.state(), ProcessingState::Confirmed);
        assert_eq!(bank.charge_attempt_count(), 1);
        assert_eq!(tax.invoice_attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_unconfirmed_booking_fails_without_remote_calls() {
        let (processor, bank, tax) = setup();
        let booking = booking_for("IBAN_BUYER");

        let err = processor.cancel_booking(&booking).await.unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidState { .. }));
        assert_eq!(booking.state(), ProcessingState::Created);
        assert_eq!(bank.cancel_attempt_count(), 0);
        assert_eq!(tax.cancel_attempt_count(), 0);
        assert_eq!(bank.charge_attempt_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_confirmed_booking_compensates_both_side_effects() {
        let (processor, bank, tax) = setup();
        let booking = booking_for("IBAN_BUYER");
        processor.submit_booking(&booking).await.unwrap();

        processor.cancel_booking(&booking).await.unwrap();

        assert_eq!(booking.state(), ProcessingState::Cancelled);
        assert_eq!(bank.cancel_attempt_count(), 1);
        assert_eq!(tax.cancel_attempt_count(), 1);
        assert_eq!(bank.payment_count(), 0);
        assert_eq!(tax.invoice_count(), 0);
        assert_eq!(processor.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_charge_keeps_booking_queued() {
        let (processor, bank, tax) = setup();
        bank.set_fail_on_charge(Some(ServiceError::Transient("down".into())));
        let booking = booking_for("IBAN_BUYER");

        processor.submit_booking(&booking).await.unwrap();

        assert_eq!(booking.state(), ProcessingState::PaymentPending);
        assert!(booking.payment_reference().is_none());
        assert_eq!(tax.invoice_attempt_count(), 0);
        assert_eq!(processor.pending_count().await, 1);
    }
}
