//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod payment;
mod store;

pub use payment::{
    Address, Charge, ChargeRequest, CustomerId, NewCustomer, PaymentError, PaymentGateway,
    Shipping,
};
pub use store::{DocumentStore, Filter};
