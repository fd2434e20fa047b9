//! Product domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lenient;
use super::record::{Collection, Document, Record, RecordId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schema(example = "Mechanical Keyboard")]
    pub name: String,
    /// Price in major currency units (dollars); numeric strings are read as numbers
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(example = 49.99)]
    pub price: f64,
    /// Descriptive fields (image, description, stock, ...)
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub details: Document,
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_roundtrips_details() {
        let doc = json!({
            "_id": "p1",
            "name": "Keyboard",
            "price": 49.5,
            "img": "https://example.com/k.png"
        });
        let product = Product::from_document(doc.as_object().unwrap().clone()).unwrap();

        assert_eq!(product.price, 49.5);
        assert_eq!(serde_json::to_value(&product).unwrap(), doc);
    }

    #[test]
    fn test_off_convention_prices_still_decode() {
        let textual = json!({ "_id": "p1", "name": "Old", "price": "49.99" });
        let garbage = json!({ "_id": "p2", "name": null, "price": "cheap" });

        let old = Product::from_document(textual.as_object().unwrap().clone()).unwrap();
        let odd = Product::from_document(garbage.as_object().unwrap().clone()).unwrap();

        assert_eq!(old.price, 49.99);
        assert_eq!(odd.price, 0.0);
        assert_eq!(odd.name, "");
    }
}
