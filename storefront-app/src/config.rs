//! Configuration loading from environment.

use std::env;

use stripe_gateway::DEFAULT_API_BASE;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_NAME: &str = "etechhouse";

/// Which payment processor checkout talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentBackend {
    Stripe { secret_key: String, api_base: String },
    Sandbox,
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub payments: PaymentBackend,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT '{}' is not a port number: {}", port, e))?,
            None => DEFAULT_PORT,
        };

        let database_url = var("DB_URI")
            .ok_or_else(|| anyhow::anyhow!("DB_URI environment variable is required"))?;
        let database_name = var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let payments = match var("PAYMENT_BACKEND").as_deref() {
            None | Some("stripe") => PaymentBackend::Stripe {
                secret_key: var("STRIPE_KEY").ok_or_else(|| {
                    anyhow::anyhow!("STRIPE_KEY environment variable is required")
                })?,
                api_base: var("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            },
            Some("sandbox") => PaymentBackend::Sandbox,
            Some(other) => anyhow::bail!(
                "PAYMENT_BACKEND must be 'stripe' or 'sandbox', got '{}'",
                other
            ),
        };

        Ok(Self {
            port,
            database_url,
            database_name,
            payments,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
