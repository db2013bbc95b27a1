//! Remote service capability and in-memory implementations.

pub mod bank;
pub mod tax;

use async_trait::async_trait;
use common::Reference;

use crate::error::ServiceError;

pub use bank::{ChargeRequest, InMemoryBank};
pub use tax::{InMemoryTax, InvoiceRequest};

/// A remote service that issues a financial side effect and can later
/// cancel it.
///
/// The bank and tax services are two instances of this one capability, so
/// the processor's retry-queue logic is written once and tests substitute
/// fakes uniformly.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// The request payload accepted by this service.
    type Request: Send + Sync;

    /// Issues the side effect, returning an opaque reference for later
    /// cancellation.
    async fn perform(&self, request: &Self::Request) -> Result<Reference, ServiceError>;

    /// Cancels a previously issued side effect by its reference.
    async fn cancel(&self, reference: &Reference) -> Result<(), ServiceError>;
}
