//! Application layer orchestrating the purchase workflow.
//!
//! `CheckoutService` is the entry point used by the HTTP interface. It drives
//! the `OrderAggregator` (pricing and gateway order creation), the signature
//! verifier, the `EnrollmentProcessor` and the `NotificationDispatcher`, each
//! of which talks to storage and external services only through the domain
//! ports.

pub mod checkout;
pub mod enrollment;
pub mod notification;
pub mod order;
