//! Persisted cart store.

use chrono::{DateTime, Utc};
use express_cache::{cache_key, Cache};
use tracing::{debug, info};

use crate::cart::{CartLine, CartState};
use crate::catalog::Product;
use crate::coupon::{AppliedCoupon, Rejection};
use crate::ids::ProductId;
use crate::money::Money;
use crate::pricing::{self, PriceBreakdown, PricingPolicy};
use crate::CommerceError;

/// Result of adding a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created.
    Added,
    /// An existing line grew to `quantity`.
    Incremented { quantity: u32 },
    /// Nothing changed: the product has only `available` units.
    CapacityReached { available: i64 },
}

impl AddOutcome {
    /// Storefront notice for the outcome.
    pub fn notice(&self, product_name: &str) -> String {
        match self {
            AddOutcome::Added => format!("{} added to cart.", product_name),
            AddOutcome::Incremented { .. } => format!("{} quantity updated.", product_name),
            AddOutcome::CapacityReached { .. } => {
                format!("Maximum stock limit reached for {}.", product_name)
            }
        }
    }
}

/// Result of changing a line's quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Updated { quantity: u32 },
    /// The requested quantity exceeded stock and was held at `quantity`.
    Clamped { quantity: u32, available: i64 },
}

impl ChangeOutcome {
    pub fn notice(&self) -> Option<String> {
        match self {
            ChangeOutcome::Updated { .. } => None,
            ChangeOutcome::Clamped { available, .. } => {
                Some(format!("Only {} units available.", available))
            }
        }
    }
}

/// State of the applied coupon after a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponStatus {
    None,
    Applied { code: String },
    /// The stored coupon stopped qualifying and was dropped.
    Evicted { code: String, reason: Rejection },
}

/// Totals for one render of the cart or checkout view.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub totals: PriceBreakdown,
    pub coupon: CouponStatus,
}

/// Owns the cart and keeps it in client-local storage.
///
/// Every mutation writes the full snapshot back before returning, so a
/// store re-opened over the same cache sees identical state.
#[derive(Debug)]
pub struct CartStore {
    state: CartState,
    cache: Cache,
    cart_key: String,
    coupon_key: String,
    policy: PricingPolicy,
}

impl CartStore {
    /// Open the cart persisted under `namespace`, or an empty one.
    pub fn open(cache: Cache, namespace: &str, policy: PricingPolicy) -> Result<Self, CommerceError> {
        let cart_key = cache_key!(namespace, "cart");
        let coupon_key = cache_key!(namespace, "coupon");

        let lines: Vec<CartLine> = cache.get(&cart_key)?.unwrap_or_default();
        let coupon: Option<AppliedCoupon> = cache.get(&coupon_key)?;
        debug!(lines = lines.len(), coupon = coupon.is_some(), "cart restored");

        Ok(Self {
            state: CartState { lines, coupon },
            cache,
            cart_key,
            coupon_key,
            policy,
        })
    }

    /// Add `quantity` units of a product, merging into an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<AddOutcome, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }

        let outcome = match self.state.line_mut(&product.id) {
            Some(line) => {
                let wanted = line.quantity.saturating_add(quantity);
                if i64::from(wanted) <= product.stock {
                    line.quantity = wanted;
                    line.stock = product.stock;
                    AddOutcome::Incremented { quantity: wanted }
                } else {
                    // Remember the lower stock so later changes cap against it.
                    line.stock = product.stock;
                    let cap = product.stock.clamp(1, i64::from(u32::MAX)) as u32;
                    line.quantity = line.quantity.min(cap);
                    AddOutcome::CapacityReached {
                        available: product.stock.max(0),
                    }
                }
            }
            None if i64::from(quantity) <= product.stock => {
                self.state.lines.push(CartLine::from_product(product, quantity));
                AddOutcome::Added
            }
            None => AddOutcome::CapacityReached {
                available: product.stock.max(0),
            },
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Move a line's quantity by `delta`, held within `[1, stock]`.
    ///
    /// A change that would reach zero is rejected; use [`remove`](Self::remove).
    pub fn change_quantity(
        &mut self,
        product_id: &ProductId,
        delta: i64,
    ) -> Result<ChangeOutcome, CommerceError> {
        let line = self
            .state
            .line_mut(product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;

        let wanted = i64::from(line.quantity).saturating_add(delta);
        if wanted < 1 {
            return Err(CommerceError::QuantityBelowOne);
        }

        let cap = line.stock.clamp(1, i64::from(u32::MAX));
        let outcome = if wanted > cap {
            line.quantity = cap as u32;
            ChangeOutcome::Clamped {
                quantity: line.quantity,
                available: line.stock,
            }
        } else {
            line.quantity = wanted as u32;
            ChangeOutcome::Updated {
                quantity: line.quantity,
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Drop a line. Returns whether one was present.
    pub fn remove(&mut self, product_id: &ProductId) -> Result<bool, CommerceError> {
        let before = self.state.lines.len();
        self.state.lines.retain(|l| &l.product_id != product_id);
        let removed = self.state.lines.len() < before;
        self.persist()?;
        Ok(removed)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.state.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.state.line(product_id)
    }

    /// Total units across all lines.
    pub fn count(&self) -> u64 {
        self.state.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lines.is_empty()
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.state.coupon.as_ref()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        Ok(pricing::compute(&self.state.lines, None, &self.policy)?.subtotal)
    }

    /// Store a validated coupon, replacing any previous one.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) -> Result<(), CommerceError> {
        self.state.coupon = Some(coupon);
        self.persist()
    }

    /// Drop the stored coupon.
    pub fn evict_coupon(&mut self) -> Result<Option<AppliedCoupon>, CommerceError> {
        let evicted = self.state.coupon.take();
        self.persist()?;
        Ok(evicted)
    }

    /// Empty the cart and forget the coupon.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.state = CartState::default();
        self.persist()
    }

    /// Recompute totals, re-deriving coupon validity against the live
    /// subtotal and `now`. A coupon that no longer qualifies is evicted.
    pub fn summary(&mut self, now: DateTime<Utc>) -> Result<CartSummary, CommerceError> {
        let subtotal = self.subtotal()?;

        let status = match &self.state.coupon {
            None => CouponStatus::None,
            Some(coupon) => match coupon.check(&subtotal, now) {
                Ok(()) => CouponStatus::Applied {
                    code: coupon.code.clone(),
                },
                Err(CommerceError::CouponRejected(reason)) => CouponStatus::Evicted {
                    code: coupon.code.clone(),
                    reason,
                },
                Err(other) => return Err(other),
            },
        };

        if let CouponStatus::Evicted { code, reason } = &status {
            info!(%code, %reason, "coupon evicted from cart");
            self.evict_coupon()?;
        }

        let totals = pricing::compute(&self.state.lines, self.state.coupon.as_ref(), &self.policy)?;
        Ok(CartSummary {
            totals,
            coupon: status,
        })
    }

    fn persist(&self) -> Result<(), CommerceError> {
        self.cache.set(&self.cart_key, &self.state.lines)?;
        match &self.state.coupon {
            Some(coupon) => self.cache.set(&self.coupon_key, coupon)?,
            None => self.cache.delete(&self.coupon_key)?,
        }
        debug!(
            lines = self.state.lines.len(),
            units = self.count(),
            "cart persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::DiscountValue;
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};
    use express_cache::MemoryBackend;

    fn inr(units: i64) -> Money {
        Money::new(units, Currency::INR)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {}", id),
            description: String::new(),
            price: inr(price),
            selling_price: inr(price),
            stock,
            image_ref: format!("{}.png", id),
            visible: true,
        }
    }

    fn store(cache: &Cache) -> CartStore {
        CartStore::open(cache.clone(), "express", PricingPolicy::default()).unwrap()
    }

    fn coupon(min: i64, expiry: DateTime<Utc>) -> AppliedCoupon {
        AppliedCoupon {
            code: "SAVE10".to_string(),
            discount: DiscountValue::Percentage(10.0),
            min_cart_value: inr(min),
            expiry,
        }
    }

    #[test]
    fn test_add_twice_increments_until_stock() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        let aspirin = product("aspirin", 5000, 2);

        assert_eq!(cart.add(&aspirin, 1).unwrap(), AddOutcome::Added);
        assert_eq!(
            cart.add(&aspirin, 1).unwrap(),
            AddOutcome::Incremented { quantity: 2 }
        );
        assert_eq!(
            cart.add(&aspirin, 1).unwrap(),
            AddOutcome::CapacityReached { available: 2 }
        );
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_refused_add_refreshes_stock_cap() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        let id = ProductId::new("aspirin");

        cart.add(&product("aspirin", 5000, 5), 3).unwrap();
        assert_eq!(
            cart.add(&product("aspirin", 5000, 2), 1).unwrap(),
            AddOutcome::CapacityReached { available: 2 }
        );
        assert_eq!(cart.line(&id).unwrap().quantity, 2);
        assert_eq!(cart.line(&id).unwrap().stock, 2);

        let changed = cart.change_quantity(&id, 2).unwrap();
        assert_eq!(
            changed,
            ChangeOutcome::Clamped {
                quantity: 2,
                available: 2
            }
        );
        assert_eq!(store(&cache).line(&id).unwrap().quantity, 2);
    }

    #[test]
    fn test_refused_add_at_zero_stock_keeps_one_unit() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        let id = ProductId::new("aspirin");

        cart.add(&product("aspirin", 5000, 4), 2).unwrap();
        assert_eq!(
            cart.add(&product("aspirin", 5000, 0), 1).unwrap(),
            AddOutcome::CapacityReached { available: 0 }
        );
        assert_eq!(cart.line(&id).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_out_of_stock_product() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        let outcome = cart.add(&product("gone", 100, 0), 1).unwrap();
        assert_eq!(outcome, AddOutcome::CapacityReached { available: 0 });
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_is_invalid() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        assert!(matches!(
            cart.add(&product("a", 100, 5), 0),
            Err(CommerceError::InvalidQuantity(0))
        ));
    }

    #[test]
    fn test_change_quantity_clamps_and_rejects_zero() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        let id = ProductId::new("a");
        cart.add(&product("a", 100, 3), 1).unwrap();

        assert_eq!(
            cart.change_quantity(&id, 1).unwrap(),
            ChangeOutcome::Updated { quantity: 2 }
        );
        let clamped = cart.change_quantity(&id, 5).unwrap();
        assert_eq!(
            clamped,
            ChangeOutcome::Clamped {
                quantity: 3,
                available: 3
            }
        );
        assert_eq!(clamped.notice().unwrap(), "Only 3 units available.");

        assert!(matches!(
            cart.change_quantity(&id, -3),
            Err(CommerceError::QuantityBelowOne)
        ));
        assert_eq!(cart.line(&id).unwrap().quantity, 3);

        assert!(matches!(
            cart.change_quantity(&ProductId::new("missing"), 1),
            Err(CommerceError::ItemNotInCart(_))
        ));
    }

    #[test]
    fn test_reopen_restores_identical_state() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        cart.add(&product("a", 100, 3), 2).unwrap();
        cart.add(&product("b", 250, 9), 1).unwrap();
        cart.apply_coupon(coupon(0, now() + Duration::days(1))).unwrap();

        let first = store(&cache);
        let second = store(&cache);
        assert_eq!(first.state(), cart.state());
        assert_eq!(second.state(), cart.state());
        assert_eq!(
            first.lines().iter().map(|l| l.product_id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        cart.add(&product("a", 100, 3), 1).unwrap();
        cart.add(&product("b", 100, 3), 1).unwrap();
        cart.apply_coupon(coupon(0, now() + Duration::days(1))).unwrap();

        assert!(cart.remove(&ProductId::new("a")).unwrap());
        assert!(!cart.remove(&ProductId::new("a")).unwrap());
        assert_eq!(store(&cache).lines().len(), 1);

        cart.clear().unwrap();
        let reopened = store(&cache);
        assert!(reopened.is_empty());
        assert!(reopened.coupon().is_none());
        assert!(!cache.exists("express:coupon").unwrap());
    }

    #[test]
    fn test_summary_evicts_coupon_below_minimum() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        cart.add(&product("a", 100, 10), 5).unwrap();
        cart.apply_coupon(coupon(500, now() + Duration::days(1))).unwrap();

        let summary = cart.summary(now()).unwrap();
        assert_eq!(summary.coupon, CouponStatus::Applied { code: "SAVE10".into() });
        assert_eq!(summary.totals.discount, inr(50));

        cart.change_quantity(&ProductId::new("a"), -1).unwrap();
        let summary = cart.summary(now()).unwrap();
        assert_eq!(
            summary.coupon,
            CouponStatus::Evicted {
                code: "SAVE10".into(),
                reason: Rejection::BelowMinimum { minimum: inr(500) }
            }
        );
        assert!(summary.totals.discount.is_zero());
        assert!(store(&cache).coupon().is_none());
    }

    #[test]
    fn test_summary_evicts_expired_coupon() {
        let cache = Cache::new(MemoryBackend::new());
        let mut cart = store(&cache);
        cart.add(&product("a", 100, 10), 1).unwrap();
        cart.apply_coupon(coupon(0, now())).unwrap();

        let summary = cart.summary(now()).unwrap();
        assert!(matches!(
            summary.coupon,
            CouponStatus::Evicted {
                reason: Rejection::Expired,
                ..
            }
        ));
    }

    #[test]
    fn test_add_notices() {
        assert_eq!(AddOutcome::Added.notice("Aspirin"), "Aspirin added to cart.");
        assert_eq!(
            AddOutcome::CapacityReached { available: 1 }.notice("Aspirin"),
            "Maximum stock limit reached for Aspirin."
        );
    }
}
