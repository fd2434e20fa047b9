//! Document store port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (MongoDB, SQLite, in-memory mocks) implement this trait.

use crate::domain::{Collection, Document, RecordId};
use crate::dto::{DeleteResult, InsertResult, UpdateResult};
use crate::error::RepoError;

/// Selects the documents an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Match the document with this identifier.
    Id(RecordId),
    /// Match documents whose string field equals `value`.
    Eq { field: String, value: String },
}

impl Filter {
    pub fn id(id: impl Into<RecordId>) -> Self {
        Filter::Id(id.into())
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if `doc` (with its `_id` as a string) satisfies the filter.
    pub fn matches(&self, id: &RecordId, doc: &Document) -> bool {
        match self {
            Filter::Id(wanted) => wanted == id,
            Filter::Eq { field, value } => {
                doc.get(field).and_then(|v| v.as_str()) == Some(value.as_str())
            }
        }
    }
}

/// Collection-oriented persistence.
///
/// Documents passed in never carry `_id`; documents handed back always carry
/// it as a string. Identifiers are assigned by the store on insert.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Inserts a document and returns its new identifier.
    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertResult, RepoError>;

    /// Finds the first document matching the filter.
    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, RepoError>;

    /// Lists all documents, optionally restricted by a filter, in insertion order.
    async fn find(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Document>, RepoError>;

    /// Sets the given fields on the first matching document.
    ///
    /// A document whose fields already hold the given values counts as
    /// matched but not modified.
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: Document,
    ) -> Result<UpdateResult, RepoError>;

    /// Removes the document with this identifier.
    async fn delete_one(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<DeleteResult, RepoError>;
}
