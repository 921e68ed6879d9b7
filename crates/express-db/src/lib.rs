//! Document store layer for Express Commerce.
//!
//! Models the remote, multi-reader/writer document store the storefront
//! talks to: named collections of JSON documents keyed by id. The
//! [`DocumentBackend`] trait is the seam; [`Db`] adds typed access on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use express_db::{Db, MemoryBackend};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Product {
//!     #[serde(default)]
//!     id: String,
//!     name: String,
//!     stock: i64,
//! }
//!
//! let db = Db::new(MemoryBackend::new());
//!
//! // Insert with a store-assigned id
//! let created = db.add_as("products", &product).await?;
//!
//! // Read back; the document id is injected as `id`
//! let product: Option<Product> = db.get_as("products", &created.id).await?;
//! ```

mod backend;
mod db;
mod error;
mod file;
mod memory;
mod types;

pub use backend::DocumentBackend;
pub use db::Db;
pub use error::{DbError, DbResult};
pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use types::{Document, DocumentRef, Precondition, CREATED_AT_FIELD, ID_FIELD};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        fields, Db, DbError, DbResult, Document, DocumentBackend, DocumentRef, MemoryBackend,
        Precondition,
    };
}

/// Build a [`Document`] of field updates.
///
/// # Example
///
/// ```rust,ignore
/// use express_db::fields;
///
/// db.update("orders", &id, fields! { "status" => "Shipped" }).await?;
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Document::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::Document::new();
        $(
            document.insert(
                ::std::string::String::from($name),
                ::serde_json::json!($value),
            );
        )+
        document
    }};
}
