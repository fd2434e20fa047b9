//! In-process payment processor.
//!
//! Understands the Stripe test tokens that matter for checkout flows and
//! keeps customers and charges in memory so tests can inspect them. Meant for
//! tests and local development: nothing is ever charged, and only the most
//! recent records (see [`DEFAULT_CAPACITY`]) are retained.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use storefront_types::{
    Charge, ChargeRequest, CustomerId, NewCustomer, PaymentError, PaymentGateway,
};

/// Declines when the customer is created.
pub const TOKEN_CHARGE_DECLINED: &str = "tok_chargeDeclined";
/// Declines when the customer is created, with an insufficient funds code.
pub const TOKEN_INSUFFICIENT_FUNDS: &str = "tok_chargeDeclinedInsufficientFunds";
/// Attaches to the customer but declines every charge.
pub const TOKEN_CUSTOMER_FAIL: &str = "tok_chargeCustomerFail";

/// Customers and charges kept per map before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct SandboxCustomer {
    email: String,
    source: String,
}

/// Map value tagged with the sequence number it was issued with.
type Sequenced<V> = (u64, V);

/// Payment gateway that never leaves the process.
#[derive(Debug)]
pub struct SandboxGateway {
    customers: DashMap<String, Sequenced<SandboxCustomer>>,
    /// Charges keyed by idempotency key
    charges: DashMap<String, Sequenced<Charge>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sandbox that keeps at most `capacity` customers and
    /// `capacity` charges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            customers: DashMap::new(),
            charges: DashMap::new(),
            next_id: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn next(&self, prefix: &str) -> (u64, String) {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        (n, format!("{}_sandbox_{}", prefix, n))
    }

    /// All charges currently retained.
    pub fn charges(&self) -> Vec<Charge> {
        self.charges
            .iter()
            .map(|entry| entry.value().1.clone())
            .collect()
    }

    pub fn charge_count(&self) -> usize {
        self.charges.len()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Email registered for a customer, if it exists.
    pub fn customer_email(&self, id: &CustomerId) -> Option<String> {
        self.customers.get(id.as_str()).map(|c| c.1.email.clone())
    }
}

/// Drops the oldest entries once `map` holds more than `capacity`, keeping
/// the newest three quarters so pruning does not run on every insert.
fn prune<V>(map: &DashMap<String, Sequenced<V>>, capacity: usize) {
    if map.len() <= capacity {
        return;
    }
    let keep = (capacity - capacity / 4).max(1);
    let mut seqs: Vec<u64> = map.iter().map(|entry| entry.value().0).collect();
    seqs.sort_unstable();
    let cutoff = seqs[seqs.len() - keep - 1];
    map.retain(|_, value| value.0 > cutoff);
    tracing::debug!(retained = map.len(), "Pruned sandbox records");
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    #[tracing::instrument(skip(self, req))]
    async fn create_customer(&self, req: NewCustomer) -> Result<CustomerId, PaymentError> {
        if req.source.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "No payment source provided".to_string(),
            ));
        }

        match req.source.as_str() {
            TOKEN_CHARGE_DECLINED => {
                return Err(PaymentError::Declined {
                    message: "Your card was declined.".to_string(),
                    code: Some("card_declined".to_string()),
                });
            }
            TOKEN_INSUFFICIENT_FUNDS => {
                return Err(PaymentError::Declined {
                    message: "Your card has insufficient funds.".to_string(),
                    code: Some("insufficient_funds".to_string()),
                });
            }
            _ => {}
        }

        let (seq, id) = self.next("cus");
        self.customers.insert(
            id.clone(),
            (
                seq,
                SandboxCustomer {
                    email: req.email,
                    source: req.source,
                },
            ),
        );
        prune(&self.customers, self.capacity);
        tracing::debug!(customer_id = %id, "Sandbox customer created");
        Ok(CustomerId::new(id))
    }

    #[tracing::instrument(skip(self, req), fields(amount = req.amount, customer = %req.customer))]
    async fn create_charge(
        &self,
        req: ChargeRequest,
        idempotency_key: &str,
    ) -> Result<Charge, PaymentError> {
        if let Some(existing) = self.charges.get(idempotency_key) {
            tracing::debug!(charge_id = %existing.1.id, "Replaying idempotent charge");
            return Ok(existing.1.clone());
        }

        let source = self
            .customers
            .get(req.customer.as_str())
            .map(|c| c.1.source.clone())
            .ok_or_else(|| {
                PaymentError::InvalidRequest(format!("No such customer: '{}'", req.customer))
            })?;

        if source == TOKEN_CUSTOMER_FAIL {
            return Err(PaymentError::Declined {
                message: "Your card was declined.".to_string(),
                code: Some("card_declined".to_string()),
            });
        }
        if req.amount <= 0 {
            return Err(PaymentError::InvalidRequest(
                "Amount must be a positive integer".to_string(),
            ));
        }

        let charge = self
            .charges
            .entry(idempotency_key.to_string())
            .or_insert_with(|| {
                let (seq, id) = self.next("ch");
                (
                    seq,
                    Charge {
                        id,
                        amount: req.amount,
                        currency: req.currency,
                        status: "succeeded".to_string(),
                        paid: true,
                    },
                )
            })
            .1
            .clone();
        prune(&self.charges, self.capacity);

        tracing::debug!(charge_id = %charge.id, "Sandbox charge created");
        Ok(charge)
    }
}
