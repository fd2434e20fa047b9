//! Domain models for the storefront service.

mod lenient;
pub mod order;
pub mod product;
pub mod record;
pub mod review;
pub mod user;

pub use order::{Order, PENDING_STATUS};
pub use product::Product;
pub use record::{Collection, Document, ID_FIELD, Record, RecordId};
pub use review::Review;
pub use user::{ADMIN_ROLE, User};
