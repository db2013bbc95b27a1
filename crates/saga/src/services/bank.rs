//! Bank service request type and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Reference;
use domain::{Iban, Money};

use crate::error::ServiceError;
use crate::services::RemoteService;

/// A request to charge a buyer's account in favour of the hotel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Amount to transfer.
    pub amount: Money,

    /// Account to charge.
    pub buyer_iban: Iban,

    /// Account to credit.
    pub hotel_iban: Iban,
}

#[derive(Debug, Default)]
struct InMemoryBankState {
    payments: HashMap<Reference, ChargeRequest>,
    next_id: u32,
    fail_on_charge: Option<ServiceError>,
    charge_failures: VecDeque<ServiceError>,
    cancel_failures: VecDeque<ServiceError>,
    charge_attempts: Vec<Iban>,
    cancel_attempts: u32,
}

/// In-memory bank service for testing.
///
/// One-shot scripted failures are consumed before the persistent
/// `fail_on_charge` setting is consulted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBank {
    state: Arc<RwLock<InMemoryBankState>>,
}

impl InMemoryBank {
    /// Creates a new in-memory bank service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail every charge with the given error.
    pub fn set_fail_on_charge(&self, error: Option<ServiceError>) {
        self.state.write().unwrap().fail_on_charge = error;
    }

    /// Scripts a single charge failure, consumed by the next charge call.
    pub fn fail_charge_once(&self, error: ServiceError) {
        self.state.write().unwrap().charge_failures.push_back(error);
    }

    /// Scripts a single cancel failure, consumed by the next cancel call.
    pub fn fail_cancel_once(&self, error: ServiceError) {
        self.state.write().unwrap().cancel_failures.push_back(error);
    }

    /// Returns the number of active (uncancelled) payments.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }

    /// Returns true if a payment exists with the given reference.
    pub fn has_payment(&self, reference: &Reference) -> bool {
        self.state.read().unwrap().payments.contains_key(reference)
    }

    /// Returns the buyer accounts of every charge attempt, in call order.
    pub fn charge_attempts(&self) -> Vec<Iban> {
        self.state.read().unwrap().charge_attempts.clone()
    }

    /// Returns the number of charge attempts made.
    pub fn charge_attempt_count(&self) -> usize {
        self.state.read().unwrap().charge_attempts.len()
    }

    /// Returns the number of cancel attempts made.
    pub fn cancel_attempt_count(&self) -> u32 {
        self.state.read().unwrap().cancel_attempts
    }
}

#[async_trait]
impl RemoteService for InMemoryBank {
    type Request = ChargeRequest;

    async fn perform(&self, request: &ChargeRequest) -> Result<Reference, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.charge_attempts.push(request.buyer_iban.clone());

        if let Some(error) = state.charge_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = state.fail_on_charge.clone() {
            return Err(error);
        }

        state.next_id += 1;
        let reference = Reference::new(format!("PAY-{:04}", state.next_id));
        state.payments.insert(reference.clone(), request.clone());

        Ok(reference)
    }

    async fn cancel(&self, reference: &Reference) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.cancel_attempts += 1;

        if let Some(error) = state.cancel_failures.pop_front() {
            return Err(error);
        }

        state.payments.remove(reference);
        Ok(())
    }
}
