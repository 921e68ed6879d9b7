//! Client-local key-value storage for Express Commerce.
//!
//! Holds the state a shopper's device keeps between page loads (the cart
//! and the applied coupon), with automatic JSON serialization. Writes are
//! synchronous: once a call returns, the value is durable in the backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use express_cache::{cache_key, Cache, MemoryBackend};
//!
//! let cache = Cache::new(MemoryBackend::new());
//!
//! // Store a value
//! cache.set(&cache_key!("express", "cart"), &lines)?;
//!
//! // Retrieve a value
//! let lines: Option<Vec<CartLine>> = cache.get(&cache_key!("express", "cart"))?;
//!
//! // Delete a value
//! cache.delete(&cache_key!("express", "cart"))?;
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{CacheBackend, FileBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheBackend, CacheError, FileBackend, MemoryBackend};
}
