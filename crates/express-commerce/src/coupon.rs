//! Discount coupons and their validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use express_db::Db;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cart::CartStore;
use crate::clock::Clock;
use crate::money::Money;
use crate::CommerceError;

/// Name of the coupons collection. Documents are keyed by code.
pub const COUPONS: &str = "coupons";

/// What a coupon takes off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DiscountValue {
    /// Percentage of the subtotal (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off.
    Fixed(Money),
}

impl DiscountValue {
    /// Raw discount for a subtotal, before any policy is applied.
    pub fn amount_for(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        match self {
            DiscountValue::Percentage(percent) => subtotal.percentage(*percent),
            DiscountValue::Fixed(amount) => Ok(*amount),
        }
    }
}

/// A coupon document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Normalized code; also the document id.
    #[serde(rename = "id", default)]
    pub code: String,
    pub discount: DiscountValue,
    pub min_cart_value: Money,
    pub expiry: DateTime<Utc>,
    pub active: bool,
}

impl Coupon {
    /// Whether the coupon can currently be redeemed.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expiry
    }
}

/// Terms of a coupon that has been applied to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: DiscountValue,
    pub min_cart_value: Money,
    pub expiry: DateTime<Utc>,
}

impl AppliedCoupon {
    /// Re-derive validity against the live subtotal.
    pub fn check(&self, subtotal: &Money, now: DateTime<Utc>) -> Result<(), CommerceError> {
        if now >= self.expiry {
            return Err(Rejection::Expired.into());
        }
        if subtotal.checked_sub(&self.min_cart_value)?.is_negative() {
            return Err(Rejection::BelowMinimum {
                minimum: self.min_cart_value,
            }
            .into());
        }
        Ok(())
    }
}

impl From<Coupon> for AppliedCoupon {
    fn from(coupon: Coupon) -> Self {
        Self {
            code: coupon.code,
            discount: coupon.discount,
            min_cart_value: coupon.min_cart_value,
            expiry: coupon.expiry,
        }
    }
}

/// Why a coupon could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("coupon not found")]
    NotFound,
    #[error("coupon is inactive")]
    Inactive,
    #[error("coupon has expired")]
    Expired,
    #[error("cart is below the minimum of {minimum}")]
    BelowMinimum { minimum: Money },
}

impl Rejection {
    /// Storefront wording.
    pub fn message(&self) -> String {
        match self {
            Rejection::NotFound => "Invalid coupon code.".to_string(),
            Rejection::Inactive | Rejection::Expired => {
                "This coupon is inactive or has expired.".to_string()
            }
            Rejection::BelowMinimum { minimum } => format!(
                "Coupon requires a minimum cart value of {}.",
                minimum.display()
            ),
        }
    }
}

/// Normalize a user-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Looks coupons up and decides whether they apply.
#[derive(Debug, Clone)]
pub struct CouponValidator {
    db: Db,
    clock: Arc<dyn Clock>,
}

impl CouponValidator {
    pub fn new(db: Db, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Validate a code against the current subtotal.
    #[instrument(skip(self), fields(subtotal = %subtotal))]
    pub async fn apply(&self, code: &str, subtotal: Money) -> Result<AppliedCoupon, CommerceError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(Rejection::NotFound.into());
        }

        let coupon: Coupon = self
            .db
            .get_as(COUPONS, &code)
            .await?
            .ok_or(Rejection::NotFound)?;

        if !coupon.active {
            debug!(%code, "coupon inactive");
            return Err(Rejection::Inactive.into());
        }

        let applied = AppliedCoupon::from(coupon);
        applied.check(&subtotal, self.clock.now())?;
        Ok(applied)
    }

    /// Validate a code against the cart and persist it alongside the cart.
    pub async fn apply_to_cart(
        &self,
        code: &str,
        cart: &mut CartStore,
    ) -> Result<AppliedCoupon, CommerceError> {
        let subtotal = cart.subtotal()?;
        let applied = self.apply(code, subtotal).await?;
        cart.apply_coupon(applied.clone())?;
        info!(code = %applied.code, "coupon applied");
        Ok(applied)
    }
}
