//! Storefront checkout core for Express Commerce.
//!
//! Turns a locally held cart into a confirmed, paid order:
//!
//! - **Cart**: persisted cart lines with stock-capped quantities
//! - **Coupon**: code lookup and validity rules
//! - **Pricing**: subtotal, discount and total
//! - **Checkout**: order records, payment gateway adapter, state machine
//! - **Stock**: post-payment stock reconciliation
//! - **Status**: admin fulfillment status changes
//!
//! # Example
//!
//! ```rust,ignore
//! use express_commerce::prelude::*;
//!
//! let mut cart = CartStore::open(cache, "express", config.pricing_policy())?;
//! cart.add(&catalog.product(&ProductId::new("paracetamol")).await?, 1)?;
//!
//! CouponValidator::new(db.clone(), clock.clone())
//!     .apply_to_cart("save10", &mut cart)
//!     .await?;
//!
//! let checkout = CheckoutOrchestrator::new(db, gateway, clock, config);
//! match checkout.submit(&mut cart, customer).await? {
//!     CheckoutOutcome::Paid(confirmation) => println!("Paid {}", confirmation.amount),
//!     CheckoutOutcome::Cancelled { reason, .. } => println!("{}", reason.notice()),
//! }
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod coupon;
pub mod dashboard;
pub mod pricing;
pub mod status;
pub mod stock;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::cart::{AddOutcome, CartLine, CartStore, CartSummary, ChangeOutcome, CouponStatus};
    pub use crate::catalog::{Catalog, Product};
    pub use crate::checkout::{
        CancelReason, CheckoutOrchestrator, CheckoutOutcome, CheckoutState, Customer,
        GatewayScript, Order, OrderRecords, OrderStatus, PaymentCallback, PaymentGateway,
        PaymentStatus, ScriptedGateway,
    };
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::CommerceConfig;
    pub use crate::coupon::{AppliedCoupon, Coupon, CouponValidator, DiscountValue, Rejection};
    pub use crate::dashboard::{Dashboard, DashboardStats};
    pub use crate::pricing::{NegativeTotalPolicy, PriceBreakdown, PricingPolicy};
    pub use crate::status::OrderStatusManager;
    pub use crate::stock::{ReconcileMode, ReconcileReport, StockReconciler};
}
