//! Payment processor port.
//!
//! This trait defines the interface for charging customers.
//! Implementations can be HTTP clients (Stripe), sandbox processors, etc.

use serde::{Deserialize, Serialize};

/// Error type for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Card declined: {message}")]
    Declined {
        message: String,
        code: Option<String>,
    },

    #[error("Payment processor error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Payment processor unreachable: {0}")]
    Transport(String),

    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),
}

/// Processor-side customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer to register with the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub email: String,
    /// Card token produced by the processor's client-side library
    pub source: String,
}

/// Postal address attached to a charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

/// Shipping details attached to a charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub name: Option<String>,
    pub address: Address,
}

/// A charge against a previously created customer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Amount in the smallest currency unit (cents)
    pub amount: i64,
    /// Lowercase ISO currency code
    pub currency: String,
    pub customer: CustomerId,
    pub receipt_email: String,
    pub description: String,
    pub shipping: Shipping,
}

/// A charge as recorded by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub paid: bool,
}

/// Port trait for payment processors.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Registers a customer and attaches the card token as its payment source.
    async fn create_customer(&self, req: NewCustomer) -> Result<CustomerId, PaymentError>;

    /// Charges a customer.
    ///
    /// The processor must treat repeated deliveries carrying the same
    /// `idempotency_key` as one charge.
    async fn create_charge(
        &self,
        req: ChargeRequest,
        idempotency_key: &str,
    ) -> Result<Charge, PaymentError>;
}
