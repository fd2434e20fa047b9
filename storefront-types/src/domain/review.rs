use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::record::{Collection, Document, Record, RecordId};

/// A customer review. Fields are free-form; by convention a review carries
/// the author's name, a text and a numeric rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Document,
}

impl Review {
    /// Numeric rating, when the review carries one.
    pub fn rating(&self) -> Option<f64> {
        self.fields.get("rating").and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;
}
