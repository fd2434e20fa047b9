//! Database row structs for the SQLite adapter.

use sqlx::FromRow;

use storefront_types::{Document, ID_FIELD, RepoError};

/// Document row from the `documents` table.
#[derive(FromRow)]
pub struct DbDocument {
    pub id: String,
    pub body: String,
}

impl DbDocument {
    /// Stored fields without the identifier.
    pub fn fields(&self) -> Result<Document, RepoError> {
        serde_json::from_str(&self.body).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    /// Convert the row to a document carrying its `_id`.
    pub fn into_document(self) -> Result<Document, RepoError> {
        let mut doc = self.fields()?;
        doc.insert(ID_FIELD.to_string(), serde_json::Value::String(self.id));
        Ok(doc)
    }
}

/// JSON path selecting a top-level field, quoted so any field name is safe.
pub fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}
