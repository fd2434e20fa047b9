//! Order domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lenient;
use super::record::{Collection, Document, Record, RecordId};

/// Status every order is placed with.
pub const PENDING_STATUS: &str = "Pending";

/// A placed order.
///
/// `status` starts as [`PENDING_STATUS`] and afterwards holds whatever
/// free-text value an admin sets. `is_paid` only ever moves to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schema(example = "a@b.com")]
    pub email: String,
    /// Product reference or snapshot, as sent by the storefront
    #[serde(default)]
    #[schema(value_type = Object)]
    pub product: serde_json::Value,
    #[serde(default = "default_status", deserialize_with = "lenient::status")]
    #[schema(example = "Pending")]
    pub status: String,
    #[serde(rename = "isPaid", default, deserialize_with = "lenient::flag")]
    pub is_paid: bool,
    /// Shipping details, quantities and other client fields
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Document,
}

fn default_status() -> String {
    PENDING_STATUS.to_string()
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == PENDING_STATUS
    }
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;
}
