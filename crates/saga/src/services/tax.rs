//! Tax service request type and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::Reference;
use domain::{Money, TaxNumber};

use crate::error::ServiceError;
use crate::services::RemoteService;

/// A request to issue an invoice for a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    /// Tax number of the buyer.
    pub buyer_nif: TaxNumber,

    /// Tax number of the hotel.
    pub hotel_nif: TaxNumber,

    /// Invoiced amount.
    pub amount: Money,

    /// Arrival date of the stay.
    pub arrival: NaiveDate,

    /// Departure date of the stay.
    pub departure: NaiveDate,
}

#[derive(Debug, Default)]
struct InMemoryTaxState {
    invoices: HashMap<Reference, InvoiceRequest>,
    next_id: u32,
    fail_on_invoice: Option<ServiceError>,
    invoice_failures: VecDeque<ServiceError>,
    cancel_failures: VecDeque<ServiceError>,
    invoice_attempts: u32,
    cancel_attempts: u32,
}

/// In-memory tax service for testing.
///
/// One-shot scripted failures are consumed before the persistent
/// `fail_on_invoice` setting is consulted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTax {
    state: Arc<RwLock<InMemoryTaxState>>,
}

impl InMemoryTax {
    /// Creates a new in-memory tax service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail every invoice with the given error.
    pub fn set_fail_on_invoice(&self, error: Option<ServiceError>) {
        self.state.write().unwrap().fail_on_invoice = error;
    }

    /// Scripts a single invoice failure, consumed by the next submit call.
    pub fn fail_invoice_once(&self, error: ServiceError) {
        self.state.write().unwrap().invoice_failures.push_back(error);
    }

    /// Scripts a single cancel failure, consumed by the next cancel call.
    pub fn fail_cancel_once(&self, error: ServiceError) {
        self.state.write().unwrap().cancel_failures.push_back(error);
    }

    /// Returns the number of active (uncancelled) invoices.
    pub fn invoice_count(&self) -> usize {
        self.state.read().unwrap().invoices.len()
    }

    /// Returns true if an invoice exists with the given reference.
    pub fn has_invoice(&self, reference: &Reference) -> bool {
        self.state.read().unwrap().invoices.contains_key(reference)
    }

    /// Returns the number of invoice attempts made.
    pub fn invoice_attempt_count(&self) -> u32 {
        self.state.read().unwrap().invoice_attempts
    }

    /// Returns the number of cancel attempts made.
    pub fn cancel_attempt_count(&self) -> u32 {
        self.state.read().unwrap().cancel_attempts
    }
}

#[async_trait]
impl RemoteService for InMemoryTax {
    type Request = InvoiceRequest;

    async fn perform(&self, request: &InvoiceRequest) -> Result<Reference, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.invoice_attempts += 1;

        if let Some(error) = state.invoice_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = state.fail_on_invoice.clone() {
            return Err(error);
        }

        state.next_id += 1;
        let reference = Reference::new(format!("INV-{:04}", state.next_id));
        state.invoices.insert(reference.clone(), request.clone());

        Ok(reference)
    }

    async fn cancel(&self, reference: &Reference) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.cancel_attempts += 1;

        if let Some(error) = state.cancel_failures.pop_front() {
            return Err(error);
        }

        state.invoices.remove(reference);
        Ok(())
    }
}
