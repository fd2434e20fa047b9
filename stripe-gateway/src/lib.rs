//! Payment processor adapters for the storefront.
//!
//! - [`StripeGateway`] talks to the Stripe REST API (`/v1/customers`,
//!   `/v1/charges`) with form-encoded requests and idempotency keys.
//! - [`SandboxGateway`] is an in-process processor that understands Stripe's
//!   test card tokens, for local development and tests.
//! - [`Gateway`] wraps either one when the processor is picked at runtime.
//!
//! # Example
//! ```no_run
//! use stripe_gateway::StripeGateway;
//!
//! let gateway = StripeGateway::new("sk_test_...").expect("http client");
//! ```

use async_trait::async_trait;
use storefront_types::{Charge, ChargeRequest, CustomerId, NewCustomer, PaymentError, PaymentGateway};

mod sandbox;
mod stripe;

pub use sandbox::{
    DEFAULT_CAPACITY, SandboxGateway, TOKEN_CHARGE_DECLINED, TOKEN_CUSTOMER_FAIL, TOKEN_INSUFFICIENT_FUNDS,
};
pub use stripe::{DEFAULT_API_BASE, StripeGateway};

/// Gateway chosen at startup.
#[derive(Debug)]
pub enum Gateway {
    Stripe(StripeGateway),
    Sandbox(SandboxGateway),
}

impl Gateway {
    /// Short name of the active processor, for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Stripe(_) => "stripe",
            Self::Sandbox(_) => "sandbox",
        }
    }
}

#[async_trait]
impl PaymentGateway for Gateway {
    async fn create_customer(&self, req: NewCustomer) -> Result<CustomerId, PaymentError> {
        match self {
            Self::Stripe(inner) => inner.create_customer(req).await,
            Self::Sandbox(inner) => inner.create_customer(req).await,
        }
    }

    async fn create_charge(
        &self,
        req: ChargeRequest,
        idempotency_key: &str,
    ) -> Result<Charge, PaymentError> {
        match self {
            Self::Stripe(inner) => inner.create_charge(req, idempotency_key).await,
            Self::Sandbox(inner) => inner.create_charge(req, idempotency_key).await,
        }
    }
}
