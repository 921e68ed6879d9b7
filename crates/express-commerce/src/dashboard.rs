//! Admin dashboard figures.

use std::sync::Arc;

use express_db::Db;
use serde::Serialize;

use crate::catalog::{Product, PRODUCTS};
use crate::checkout::{Order, PaymentStatus, ORDERS};
use crate::clock::Clock;
use crate::coupon::{Coupon, COUPONS};
use crate::CommerceError;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    /// Sum of stock across all products.
    pub units_in_stock: i64,
    /// Coupons that are active and not yet expired.
    pub active_coupons: usize,
    /// Orders still waiting on a payment callback.
    pub awaiting_payment: usize,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    db: Db,
    clock: Arc<dyn Clock>,
}

impl Dashboard {
    pub fn new(db: Db, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub async fn stats(&self) -> Result<DashboardStats, CommerceError> {
        let now = self.clock.now();
        let orders: Vec<Order> = self.db.list_as(ORDERS).await?;
        let products: Vec<Product> = self.db.list_as(PRODUCTS).await?;
        let coupons: Vec<Coupon> = self.db.list_as(COUPONS).await?;

        let units_in_stock = products
            .iter()
            .try_fold(0i64, |total, p| total.checked_add(p.stock))
            .ok_or(CommerceError::Overflow)?;

        Ok(DashboardStats {
            total_orders: orders.len(),
            units_in_stock,
            active_coupons: coupons.iter().filter(|c| c.is_live_at(now)).count(),
            awaiting_payment: orders
                .iter()
                .filter(|o| o.payment_status == PaymentStatus::Pending)
                .count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::clock::FixedClock;
    use crate::coupon::DiscountValue;
    use crate::ids::ProductId;
    use crate::money::{Currency, Money};
    use chrono::{Duration, TimeZone, Utc};
    use express_db::MemoryBackend;

    #[tokio::test]
    async fn test_stats() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let db = Db::new(MemoryBackend::new());
        let catalog = Catalog::new(db.clone());
        for (id, stock) in [("a", 4), ("b", 0), ("c", 7)] {
            catalog
                .upsert(&Product {
                    id: ProductId::new(id),
                    name: id.into(),
                    description: String::new(),
                    price: Money::new(100, Currency::INR),
                    selling_price: Money::new(100, Currency::INR),
                    stock,
                    image_ref: String::new(),
                    visible: true,
                })
                .await
                .unwrap();
        }
        for (code, active, expiry) in [
            ("LIVE", true, now + Duration::days(1)),
            ("OFF", false, now + Duration::days(1)),
            ("DONE", true, now - Duration::days(1)),
        ] {
            let coupon = Coupon {
                code: code.into(),
                discount: DiscountValue::Percentage(5.0),
                min_cart_value: Money::zero(Currency::INR),
                expiry,
                active,
            };
            db.set_as(COUPONS, code, &coupon).await.unwrap();
        }

        let stats = Dashboard::new(db, Arc::new(FixedClock::new(now)))
            .stats()
            .await
            .unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_orders: 0,
                units_in_stock: 11,
                active_coupons: 1,
                awaiting_payment: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_stock_total_overflow_is_an_error() {
        let db = Db::new(MemoryBackend::new());
        let catalog = Catalog::new(db.clone());
        for (id, stock) in [("a", i64::MAX), ("b", 1)] {
            catalog
                .upsert(&Product {
                    id: ProductId::new(id),
                    name: id.into(),
                    description: String::new(),
                    price: Money::new(100, Currency::INR),
                    selling_price: Money::new(100, Currency::INR),
                    stock,
                    image_ref: String::new(),
                    visible: true,
                })
                .await
                .unwrap();
        }

        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()));
        let err = Dashboard::new(db, clock).stats().await.unwrap_err();
        assert!(matches!(err, CommerceError::Overflow));
    }
}
