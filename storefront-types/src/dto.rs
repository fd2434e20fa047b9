//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Request payloads validate themselves at the boundary and turn into the
//! documents handed to the store; results are the stable contracts returned
//! by write operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Document, ID_FIELD, PENDING_STATUS, RecordId};
use crate::error::DomainError;

/// Serializes a flattened payload into a store document without any `_id`.
fn into_document<T: Serialize>(value: &T) -> Document {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(mut doc)) => {
            doc.remove(ID_FIELD);
            doc
        }
        _ => Document::new(),
    }
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::Validation("email cannot be empty".into()));
    }
    if !email.contains('@') {
        return Err(DomainError::Validation(format!(
            "email '{}' is not an address",
            email
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::Validation(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    #[schema(example = "a@b.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Other profile fields (displayName, ...)
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Document,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)
    }

    pub fn into_document(self) -> Document {
        into_document(&self)
    }
}

/// Request to promote a user to admin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRequest {
    #[schema(example = "a@b.com")]
    pub email: String,
}

impl AdminRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Product DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add a product to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewProduct {
    #[schema(example = "Mechanical Keyboard")]
    pub name: String,
    /// Price in major currency units
    #[schema(example = 49.99)]
    pub price: f64,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub details: Document,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "product name cannot be empty".into(),
            ));
        }
        validate_price(self.price)
    }

    pub fn into_document(self) -> Document {
        into_document(&self)
    }
}

/// Partial product update: only the given fields are replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductUpdate {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Document,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.fields.keys().all(|k| k == ID_FIELD) {
            return Err(DomainError::Validation(
                "product update has no fields".into(),
            ));
        }
        if let Some(name) = self.fields.get("name") {
            match name.as_str() {
                Some(n) if !n.trim().is_empty() => {}
                _ => {
                    return Err(DomainError::Validation(
                        "product name cannot be empty".into(),
                    ));
                }
            }
        }
        if let Some(price) = self.fields.get("price") {
            let price = price.as_f64().ok_or_else(|| {
                DomainError::Validation("price must be a non-negative number".into())
            })?;
            validate_price(price)?;
        }
        Ok(())
    }

    /// Fields to set, with the immutable identifier removed.
    pub fn into_set(mut self) -> Document {
        self.fields.remove(ID_FIELD);
        self.fields
    }
}

/// Query string of `PUT /updateProduct`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductIdQuery {
    pub id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Order DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to place an order.
///
/// Any `_id`, `status` or `isPaid` sent by the client is overridden: a new
/// order always starts pending and unpaid with a store-assigned identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    #[schema(example = "a@b.com")]
    pub email: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub product: serde_json::Value,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Document,
}

impl PlaceOrderRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() {
            return Err(DomainError::Validation("order email cannot be empty".into()));
        }
        Ok(())
    }

    pub fn into_document(self) -> Document {
        let mut doc = into_document(&self);
        doc.insert("status".into(), PENDING_STATUS.into());
        doc.insert("isPaid".into(), false.into());
        doc
    }
}

/// Query string of `GET /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    pub email: Option<String>,
}

/// Request body carrying an order identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderIdRequest {
    #[schema(example = "65f1c0ffee0123456789abcd")]
    pub id: String,
}

/// Request to change an order's status. Any string is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "65f1c0ffee0123456789abcd")]
    pub id: String,
    #[schema(example = "Shipped")]
    pub status: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Review DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NewReview {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Document,
}

impl NewReview {
    pub fn into_document(self) -> Document {
        let mut fields = self.fields;
        fields.remove(ID_FIELD);
        fields
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// The product being bought.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutProduct {
    #[schema(example = "Mechanical Keyboard")]
    pub name: String,
    /// Price in major currency units
    #[schema(example = 49.99)]
    pub price: f64,
}

/// Card metadata returned by the processor's client-side tokenizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TokenCard {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_city: Option<String>,
    pub address_country: Option<String>,
    pub address_zip: Option<String>,
}

/// Payment token (card token plus billing details).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentToken {
    #[schema(example = "tok_visa")]
    pub id: String,
    #[schema(example = "a@b.com")]
    pub email: String,
    #[serde(default)]
    pub card: TokenCard,
}

/// Request to charge a customer for one product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub product: CheckoutProduct,
    pub token: PaymentToken,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.product.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "product name cannot be empty".into(),
            ));
        }
        validate_price(self.product.price)?;
        if self.token.id.trim().is_empty() {
            return Err(DomainError::Validation("payment token is missing".into()));
        }
        validate_email(&self.token.email)
    }

    /// Price converted to minor units (cents).
    pub fn amount_minor(&self) -> i64 {
        (self.product.price * 100.0).round() as i64
    }
}

/// Outcome of a checkout, reported in the body with HTTP 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Success,
    Failure,
}

/// Response of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    /// Failure reason; `null` on success
    pub error: Option<String>,
    pub status: CheckoutStatus,
}

impl CheckoutResponse {
    pub fn success() -> Self {
        Self {
            error: None,
            status: CheckoutStatus::Success,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            status: CheckoutStatus::Failure,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write results
// ─────────────────────────────────────────────────────────────────────────────

/// Result of inserting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub inserted_id: RecordId,
}

/// Result of updating a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[schema(example = 1)]
    pub matched_count: u64,
    #[schema(example = 1)]
    pub modified_count: u64,
}

/// Result of deleting a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    #[schema(example = 1)]
    pub deleted_count: u64,
}
