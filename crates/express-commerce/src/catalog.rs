//! Product catalog as seen by the storefront.
//!
//! The catalog is owned by admin tooling; the checkout core only reads
//! products and, through [`StockReconciler`](crate::stock::StockReconciler),
//! writes their `stock` field.

use express_db::Db;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::ids::ProductId;
use crate::money::Money;
use crate::CommerceError;

/// Name of the products collection.
pub const PRODUCTS: &str = "products";

/// A product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document id (injected on read, never stored).
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// List price (MRP).
    pub price: Money,
    /// Price actually charged.
    pub selling_price: Money,
    /// Units on hand. May be negative after an oversell.
    pub stock: i64,
    #[serde(default)]
    pub image_ref: String,
    #[serde(default)]
    pub visible: bool,
}

impl Product {
    /// Whether the storefront offers this product.
    pub fn is_purchasable(&self) -> bool {
        self.visible && self.stock > 0
    }
}

/// Read access to the `products` collection.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: Db,
}

impl Catalog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Products shown on the storefront: visible and in stock.
    #[instrument(skip(self))]
    pub async fn storefront(&self) -> Result<Vec<Product>, CommerceError> {
        let products: Vec<Product> = self.db.list_as(PRODUCTS).await?;
        let listed: Vec<Product> = products.into_iter().filter(Product::is_purchasable).collect();
        debug!(count = listed.len(), "storefront listing loaded");
        Ok(listed)
    }

    /// Every product, regardless of visibility.
    pub async fn all(&self) -> Result<Vec<Product>, CommerceError> {
        Ok(self.db.list_as(PRODUCTS).await?)
    }

    /// Fetch one product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        self.db
            .get_as(PRODUCTS, id.as_str())
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    /// Create or replace a product under its id.
    pub async fn upsert(&self, product: &Product) -> Result<(), CommerceError> {
        self.db.set_as(PRODUCTS, product.id.as_str(), product).await?;
        Ok(())
    }
}
