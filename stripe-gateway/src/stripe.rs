//! Stripe REST adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use storefront_types::{
    Charge, ChargeRequest, CustomerId, NewCustomer, PaymentError, PaymentGateway,
};

/// Production Stripe API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Payment gateway backed by the Stripe API.
pub struct StripeGateway {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("api_base", &self.api_base)
            .field("secret_key", &"***")
            .finish()
    }
}

impl StripeGateway {
    /// Creates a gateway against the production Stripe API.
    pub fn new(secret_key: impl Into<String>) -> Result<Self, PaymentError> {
        Self::with_api_base(secret_key, DEFAULT_API_BASE)
    }

    /// Creates a gateway against a custom base URL (stripe-mock, a proxy, ...).
    pub fn with_api_base(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&'static str, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, PaymentError> {
        let mut req = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .form(form);
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| PaymentError::Api {
                status: status.as_u16(),
                message: format!("unexpected response body: {}", e),
            })
        } else {
            Err(parse_error(status.as_u16(), &body))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StripeCustomer {
    id: String,
}

#[derive(Deserialize)]
struct StripeCharge {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    #[serde(default)]
    paid: bool,
}

impl From<StripeCharge> for Charge {
    fn from(c: StripeCharge) -> Self {
        Charge {
            id: c.id,
            amount: c.amount,
            currency: c.currency,
            status: c.status,
            paid: c.paid,
        }
    }
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
    code: Option<String>,
}

fn parse_error(status: u16, body: &str) -> PaymentError {
    let Ok(StripeErrorBody { error }) = serde_json::from_str::<StripeErrorBody>(body) else {
        return PaymentError::Api {
            status,
            message: body.to_string(),
        };
    };

    let message = error
        .message
        .unwrap_or_else(|| format!("Stripe request failed with status {}", status));

    if status == 402 || error.kind.as_deref() == Some("card_error") {
        PaymentError::Declined {
            message,
            code: error.code,
        }
    } else {
        PaymentError::Api { status, message }
    }
}

fn customer_form(req: &NewCustomer) -> Vec<(&'static str, String)> {
    vec![("email", req.email.clone()), ("source", req.source.clone())]
}

fn charge_form(req: &ChargeRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("amount", req.amount.to_string()),
        ("currency", req.currency.clone()),
        ("customer", req.customer.to_string()),
        ("receipt_email", req.receipt_email.clone()),
        ("description", req.description.clone()),
    ];

    let shipping = &req.shipping;
    let optional = [
        ("shipping[name]", &shipping.name),
        ("shipping[address][line1]", &shipping.address.line1),
        ("shipping[address][line2]", &shipping.address.line2),
        ("shipping[address][city]", &shipping.address.city),
        ("shipping[address][country]", &shipping.address.country),
        ("shipping[address][postal_code]", &shipping.address.postal_code),
    ];
    form.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, v))),
    );

    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[tracing::instrument(skip(self, req))]
    async fn create_customer(&self, req: NewCustomer) -> Result<CustomerId, PaymentError> {
        let customer: StripeCustomer = self
            .post_form("/v1/customers", &customer_form(&req), None)
            .await?;
        tracing::debug!(customer_id = %customer.id, "Stripe customer created");
        Ok(CustomerId::new(customer.id))
    }

    #[tracing::instrument(skip(self, req), fields(amount = req.amount, customer = %req.customer))]
    async fn create_charge(
        &self,
        req: ChargeRequest,
        idempotency_key: &str,
    ) -> Result<Charge, PaymentError> {
        let charge: StripeCharge = self
            .post_form("/v1/charges", &charge_form(&req), Some(idempotency_key))
            .await?;
        tracing::debug!(charge_id = %charge.id, status = %charge.status, "Stripe charge created");
        Ok(charge.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use storefront_types::{Address, Shipping};

    fn charge_request() -> ChargeRequest {
        ChargeRequest {
            amount: 4999,
            currency: "usd".into(),
            customer: CustomerId::new("cus_123"),
            receipt_email: "a@b.com".into(),
            description: "Purchased the Keyboard".into(),
            shipping: Shipping {
                name: Some("Ada".into()),
                address: Address {
                    line1: Some("221B Baker Street".into()),
                    city: Some("London".into()),
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_charge_form_skips_missing_address_fields() {
        let form: HashMap<_, _> = charge_form(&charge_request()).into_iter().collect();

        assert_eq!(form["amount"], "4999");
        assert_eq!(form["currency"], "usd");
        assert_eq!(form["shipping[name]"], "Ada");
        assert_eq!(form["shipping[address][city]"], "London");
        assert!(!form.contains_key("shipping[address][line2]"));
        assert!(!form.contains_key("shipping[address][postal_code]"));
    }

    #[test]
    fn test_card_error_maps_to_declined() {
        let body = r#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#;
        let err = parse_error(402, body);
        assert!(matches!(
            err,
            PaymentError::Declined { ref message, ref code }
                if message == "Your card was declined." && code.as_deref() == Some("card_declined")
        ));
    }

    #[test]
    fn test_non_json_error_keeps_body() {
        let err = parse_error(502, "Bad Gateway");
        assert!(matches!(err, PaymentError::Api { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let gateway = StripeGateway::new("sk_test_secret").unwrap();
        let debug = format!("{:?}", gateway);
        assert!(!debug.contains("sk_test_secret"));
    }

    #[derive(Default)]
    struct Seen {
        auth: Vec<String>,
        idempotency_keys: Vec<String>,
        charge_forms: Vec<HashMap<String, String>>,
    }

    type Shared = Arc<Mutex<Seen>>;

    async fn customers(
        State(seen): State<Shared>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().auth.push(auth);

        if form.get("source").map(String::as_str) == Some("tok_chargeDeclined") {
            return (
                StatusCode::PAYMENT_REQUIRED,
                Json(serde_json::json!({
                    "error": { "type": "card_error", "code": "card_declined", "message": "Your card was declined." }
                })),
            );
        }
        (StatusCode::OK, Json(serde_json::json!({ "id": "cus_mock" })))
    }

    async fn charges(
        State(seen): State<Shared>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let key = headers
            .get("idempotency-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let amount: i64 = form.get("amount").and_then(|a| a.parse().ok()).unwrap_or(0);
        let mut seen = seen.lock().unwrap();
        seen.idempotency_keys.push(key);
        seen.charge_forms.push(form);

        Json(serde_json::json!({
            "id": "ch_mock",
            "amount": amount,
            "currency": "usd",
            "status": "succeeded",
            "paid": true
        }))
    }

    async fn spawn_mock() -> (String, Shared) {
        let seen = Shared::default();
        let app = Router::new()
            .route("/v1/customers", post(customers))
            .route("/v1/charges", post(charges))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    #[tokio::test]
    async fn test_customer_then_charge_against_mock_api() {
        let (base, seen) = spawn_mock().await;
        let gateway = StripeGateway::with_api_base("sk_test_abc", base).unwrap();

        let customer = gateway
            .create_customer(NewCustomer {
                email: "a@b.com".into(),
                source: "tok_visa".into(),
            })
            .await
            .unwrap();
        assert_eq!(customer.as_str(), "cus_mock");

        let charge = gateway
            .create_charge(charge_request(), "key-1")
            .await
            .unwrap();
        assert_eq!(charge.amount, 4999);
        assert!(charge.paid);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.auth, vec!["Bearer sk_test_abc".to_string()]);
        assert_eq!(seen.idempotency_keys, vec!["key-1".to_string()]);
        assert_eq!(seen.charge_forms[0]["description"], "Purchased the Keyboard");
        assert_eq!(seen.charge_forms[0]["shipping[address][line1]"], "221B Baker Street");
    }

    #[tokio::test]
    async fn test_declined_card_against_mock_api() {
        let (base, _seen) = spawn_mock().await;
        let gateway = StripeGateway::with_api_base("sk_test_abc", base).unwrap();

        let err = gateway
            .create_customer(NewCustomer {
                email: "a@b.com".into(),
                source: "tok_chargeDeclined".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Declined { .. }));
    }
}
