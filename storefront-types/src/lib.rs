//! # Storefront Types
//!
//! Domain records and port traits for the storefront service.
//! This crate has ZERO external IO dependencies - only data structures,
//! boundary validation, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Stored records (User, Product, Order, Review) and identifiers
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request payloads and result contracts for the API boundary
//! - `error/` - Domain, repository, and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ADMIN_ROLE, Collection, Document, ID_FIELD, Order, PENDING_STATUS, Product, Record, RecordId,
    Review, User,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    Address, Charge, ChargeRequest, CustomerId, DocumentStore, Filter, NewCustomer, PaymentError,
    PaymentGateway, Shipping,
};
