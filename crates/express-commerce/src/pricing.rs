//! Cart totals.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::coupon::AppliedCoupon;
use crate::money::{Currency, Money};
use crate::CommerceError;

/// What to do when a fixed discount exceeds the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NegativeTotalPolicy {
    /// Cap the discount at the subtotal so the total bottoms out at zero.
    #[default]
    Clamp,
    /// Take the full discount; the total may go below zero.
    Allow,
}

/// Inputs to totals computation that are not part of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingPolicy {
    pub currency: Currency,
    pub negative_total: NegativeTotalPolicy,
}

/// Computed totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Amount in minor units to hand to the payment gateway.
    pub fn amount_minor_units(&self) -> i64 {
        self.total.minor_units
    }
}

/// Compute subtotal, discount and total.
///
/// The coupon only contributes when the subtotal meets its minimum; expiry
/// is the caller's concern since this function has no clock.
pub fn compute(
    lines: &[CartLine],
    coupon: Option<&AppliedCoupon>,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, CommerceError> {
    let line_totals = lines
        .iter()
        .map(CartLine::line_total)
        .collect::<Result<Vec<_>, _>>()?;
    let subtotal = Money::try_sum(&line_totals, policy.currency)?;

    let discount = match coupon {
        Some(coupon) if !subtotal.checked_sub(&coupon.min_cart_value)?.is_negative() => {
            let raw = coupon.discount.amount_for(&subtotal)?;
            let raw = if raw.is_negative() {
                Money::zero(policy.currency)
            } else {
                raw
            };
            match policy.negative_total {
                NegativeTotalPolicy::Clamp => raw.min(&subtotal)?,
                NegativeTotalPolicy::Allow => raw,
            }
        }
        _ => Money::zero(policy.currency),
    };

    let total = subtotal.checked_sub(&discount)?;
    Ok(PriceBreakdown {
        subtotal,
        discount,
        total,
    })
}
