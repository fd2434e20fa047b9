//! # Storefront Hex
//!
//! Application service layer and HTTP adapter for the storefront service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (orchestrates store and payment calls)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `S: DocumentStore` and `P: PaymentGateway`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::StoreService;
