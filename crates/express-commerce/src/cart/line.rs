//! Cart line and cart state types.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::coupon::AppliedCoupon;
use crate::ids::ProductId;
use crate::money::Money;
use crate::CommerceError;

/// A product line in the cart.
///
/// Name, price and image are snapshots taken when the product was first
/// added; `stock` is the last stock level the storefront saw for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_ref: String,
    pub stock: i64,
}

impl CartLine {
    /// Start a line for a product.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.selling_price,
            quantity,
            image_ref: product.image_ref.clone(),
            stock: product.stock,
        }
    }

    /// `unit_price × quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Everything the client keeps between page loads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub coupon: Option<AppliedCoupon>,
}

impl CartState {
    pub(crate) fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    pub(crate) fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == product_id)
    }
}
