//! Record identity and collection naming shared by every stored entity.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

use crate::error::RepoError;

/// A loosely-structured stored document (field name -> JSON value).
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field under which every stored document carries its identifier.
pub const ID_FIELD: &str = "_id";

/// Store-assigned identifier of a record.
///
/// Opaque to the service: the MongoDB adapter uses ObjectId hex strings,
/// the SQLite adapter uses UUIDs. Each adapter validates the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owned identifier.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Named groups of documents in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Reviews,
}

impl Collection {
    /// All collections, in a stable order.
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Products,
        Collection::Orders,
        Collection::Reviews,
    ];

    /// Physical collection name in the document store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Orders => "orders",
            // singular in the deployed database
            Collection::Reviews => "review",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed view over a document of one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sized {
    /// Collection the record lives in.
    const COLLECTION: Collection;

    /// Decodes a stored document (including its `_id`) into the record.
    fn from_document(doc: Document) -> Result<Self, RepoError> {
        serde_json::from_value(serde_json::Value::Object(doc))
            .map_err(|e| RepoError::Serialization(format!("{}: {}", Self::COLLECTION, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Users.name(), "users");
        assert_eq!(Collection::Products.name(), "products");
        assert_eq!(Collection::Orders.name(), "orders");
        assert_eq!(Collection::Reviews.name(), "review");
    }

    #[test]
    fn test_record_id_is_transparent() {
        let id = RecordId::new("65f1c0ffee");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65f1c0ffee\"");
        assert_eq!(id.to_string(), "65f1c0ffee");
    }
}
