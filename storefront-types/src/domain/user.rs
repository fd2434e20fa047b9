//! User domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lenient;
use super::record::{Collection, Document, Record, RecordId};

/// Role value that marks a user as a storefront administrator.
pub const ADMIN_ROLE: &str = "admin";

/// A registered storefront user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schema(example = "a@b.com")]
    pub email: String,
    /// Absent for regular customers, `"admin"` once promoted
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    /// Any other profile fields the client registered
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Document,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}
