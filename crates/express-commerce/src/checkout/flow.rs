//! Checkout state machine.
//!
//! ```text
//! Draft ──begin──▶ PendingPayment ──success──▶ Paid
//!                        │
//!                        └──dismissed / abandoned──▶ Cancelled
//! ```
//!
//! The order record is written before the gateway is invoked, and stock is
//! reconciled only after the payment has been recorded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{info, instrument, warn};

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::{
    Customer, Order, OrderDraft, OrderRecords, PaymentCallback, PaymentGateway, PaymentOutcome,
    PaymentRequest, Prefill,
};
use crate::clock::Clock;
use crate::config::CommerceConfig;
use crate::error::ErrorKind;
use crate::ids::{OrderId, PaymentReference};
use crate::money::Money;
use crate::stock::{ReconcileReport, StockReconciler};
use crate::CommerceError;
use express_db::Db;

/// Where a checkout attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutState {
    /// Only a cart exists.
    Draft,
    /// Order recorded, gateway invoked, waiting for its callback.
    PendingPayment,
    Paid,
    Cancelled,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Draft => "draft",
            CheckoutState::PendingPayment => "pending_payment",
            CheckoutState::Paid => "paid",
            CheckoutState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Paid | CheckoutState::Cancelled)
    }
}

/// Why a payment attempt was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    /// The customer closed the payment sheet.
    Dismissed,
    /// The callback was dropped or the payment timeout elapsed.
    Abandoned,
}

impl CancelReason {
    pub fn notice(&self) -> &'static str {
        match self {
            CancelReason::Dismissed => "Payment was cancelled.",
            CancelReason::Abandoned => "Payment was not completed.",
        }
    }
}

/// What the confirmation view shows after a successful payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub amount: Money,
    pub payment_reference: PaymentReference,
    pub reconciliation: ReconcileReport,
}

/// Terminal result of a checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Paid(Confirmation),
    Cancelled {
        order_id: OrderId,
        reason: CancelReason,
    },
}

impl CheckoutOutcome {
    pub fn state(&self) -> CheckoutState {
        match self {
            CheckoutOutcome::Paid(_) => CheckoutState::Paid,
            CheckoutOutcome::Cancelled { .. } => CheckoutState::Cancelled,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        match self {
            CheckoutOutcome::Paid(confirmation) => &confirmation.order_id,
            CheckoutOutcome::Cancelled { order_id, .. } => order_id,
        }
    }

    /// `Payment` for a cancelled attempt, nothing for a paid one.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            CheckoutOutcome::Paid(_) => None,
            CheckoutOutcome::Cancelled { .. } => Some(ErrorKind::Payment),
        }
    }
}

/// A checkout waiting for the gateway's callback.
#[derive(Debug)]
pub struct PendingCheckout {
    order: Order,
    receiver: oneshot::Receiver<PaymentOutcome>,
}

impl PendingCheckout {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn state(&self) -> CheckoutState {
        CheckoutState::PendingPayment
    }
}

/// Drives a cart through order creation, payment and reconciliation.
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator {
    orders: OrderRecords,
    catalog: Catalog,
    reconciler: StockReconciler,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    config: CommerceConfig,
}

impl CheckoutOrchestrator {
    pub fn new(
        db: Db,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        config: CommerceConfig,
    ) -> Self {
        Self {
            orders: OrderRecords::new(db.clone()),
            catalog: Catalog::new(db.clone()),
            reconciler: StockReconciler::from_config(db, &config.stock),
            gateway,
            clock,
            config,
        }
    }

    pub fn orders(&self) -> &OrderRecords {
        &self.orders
    }

    /// `Draft → PendingPayment`: record the order and open the payment sheet.
    ///
    /// Nothing is written when the cart is empty, the customer details are
    /// incomplete, live stock no longer covers the cart, or the total is
    /// negative.
    #[instrument(skip(self, cart, customer), fields(lines = cart.lines().len()))]
    pub async fn begin(
        &self,
        cart: &mut CartStore,
        customer: Customer,
    ) -> Result<PendingCheckout, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let missing = customer.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(missing.join(", ")));
        }

        let summary = cart.summary(self.clock.now())?;
        self.check_live_stock(cart).await?;
        if summary.totals.total.is_negative() {
            return Err(CommerceError::NegativeTotal);
        }

        let draft = OrderDraft::pending(
            customer,
            cart.lines().to_vec(),
            summary.totals,
            cart.coupon().map(|c| c.code.clone()),
        );
        let order = self.orders.create(draft).await?;

        let request = self.payment_request(&order);
        let (callback, receiver) = PaymentCallback::channel();
        if let Err(e) = self.gateway.open(request, callback).await {
            warn!(order_id = %order.id, error = %e, "gateway failed to open");
            if let Err(mark) = self.orders.mark_payment_failed(&order.id).await {
                warn!(order_id = %order.id, error = %mark, "could not cancel order after gateway failure");
            }
            return Err(e);
        }

        info!(order_id = %order.id, total = %order.total, "awaiting payment");
        Ok(PendingCheckout { order, receiver })
    }

    /// `PendingPayment → Paid | Cancelled`: wait for the callback and apply it.
    #[instrument(skip(self, pending, cart), fields(order_id = %pending.order.id))]
    pub async fn complete(
        &self,
        pending: PendingCheckout,
        cart: &mut CartStore,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let PendingCheckout { order, receiver } = pending;

        let outcome = match self.config.payment_timeout() {
            Some(limit) => match tokio::time::timeout(limit, receiver).await {
                Ok(result) => result.ok(),
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "payment timed out");
                    None
                }
            },
            None => receiver.await.ok(),
        };

        match outcome {
            Some(PaymentOutcome::Succeeded(reference)) => {
                self.orders.mark_paid(&order.id, &reference).await?;
                let reconciliation = self.reconciler.reconcile(&order.items).await;
                if let Err(e) = cart.clear() {
                    warn!(error = %e, "could not clear cart after payment");
                }
                info!(amount = %order.total, "checkout paid");
                Ok(CheckoutOutcome::Paid(Confirmation {
                    order_id: order.id,
                    amount: order.total,
                    payment_reference: reference,
                    reconciliation,
                }))
            }
            Some(PaymentOutcome::Dismissed) => self.cancel(order.id, CancelReason::Dismissed).await,
            None => self.cancel(order.id, CancelReason::Abandoned).await,
        }
    }

    /// Run a checkout from submission to its terminal state.
    pub async fn submit(
        &self,
        cart: &mut CartStore,
        customer: Customer,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let pending = self.begin(cart, customer).await?;
        self.complete(pending, cart).await
    }

    async fn cancel(
        &self,
        order_id: OrderId,
        reason: CancelReason,
    ) -> Result<CheckoutOutcome, CommerceError> {
        self.orders.mark_payment_failed(&order_id).await?;
        info!(?reason, "checkout cancelled; cart kept");
        Ok(CheckoutOutcome::Cancelled { order_id, reason })
    }

    async fn check_live_stock(&self, cart: &CartStore) -> Result<(), CommerceError> {
        for line in cart.lines() {
            let product = self.catalog.product(&line.product_id).await?;
            if product.stock < i64::from(line.quantity) {
                return Err(CommerceError::InsufficientStock {
                    product_id: line.product_id.to_string(),
                    requested: i64::from(line.quantity),
                    available: product.stock,
                });
            }
        }
        Ok(())
    }

    fn payment_request(&self, order: &Order) -> PaymentRequest {
        PaymentRequest {
            key: self.config.gateway.key.clone(),
            amount_minor_units: order.total.minor_units,
            currency: order.total.currency,
            merchant_name: self.config.store.name.clone(),
            description: format!("Order ID: {}", order.id),
            external_reference: order.id.clone(),
            prefill: Prefill {
                name: order.customer.name.clone(),
                email: order.customer.email.clone(),
                contact: order.customer.phone.clone(),
            },
            theme_color: self.config.gateway.theme_color.clone(),
        }
    }
}
