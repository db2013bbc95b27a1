//! Booking saga processor.
//!
//! This crate drives each booking through a two-phase distributed side
//! effect: capture the payment via the bank service, then issue an invoice
//! via the tax service. Cancelling a confirmed booking runs the symmetric
//! compensation path (reverse the payment, cancel the invoice).
//!
//! Remote failures of either kind are absorbed inside the drain and the
//! booking stays queued; the next call to any processor entry point retries
//! it. There is no timer or background worker.

pub mod error;
pub mod processor;
pub mod services;

pub use error::{ProcessorError, ServiceError};
pub use processor::Processor;
pub use services::{
    ChargeRequest, InMemoryBank, InMemoryTax, InvoiceRequest, RemoteService,
};
