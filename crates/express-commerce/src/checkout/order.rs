//! Order records.

use chrono::{DateTime, Utc};
use express_db::{fields, Db, DbError, DocumentRef, Precondition};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cart::CartLine;
use crate::ids::{OrderId, PaymentReference};
use crate::money::Money;
use crate::pricing::PriceBreakdown;
use crate::CommerceError;

/// Name of the orders collection.
pub const ORDERS: &str = "orders";

/// Contact and delivery details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Fulfillment status. Admin-controlled; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Parse a status name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status. System-controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as written at checkout, before the store assigns id and
/// creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer: Customer,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<PaymentReference>,
}

impl OrderDraft {
    /// A pending order for the given lines and totals.
    pub fn pending(
        customer: Customer,
        items: Vec<CartLine>,
        totals: PriceBreakdown,
        coupon_code: Option<String>,
    ) -> Self {
        Self {
            customer,
            items,
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
            coupon_code,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
        }
    }

    fn into_order(self, created: DocumentRef) -> Order {
        Order {
            id: OrderId::new(created.id),
            customer: self.customer,
            items: self.items,
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            coupon_code: self.coupon_code,
            status: self.status,
            payment_status: self.payment_status,
            payment_reference: self.payment_reference,
            created_at: created.created_at,
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: OrderId,
    pub customer: Customer,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_reference: Option<PaymentReference>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Reads and writes the `orders` collection.
#[derive(Debug, Clone)]
pub struct OrderRecords {
    db: Db,
}

impl OrderRecords {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Persist a new order and return it with its assigned id.
    #[instrument(skip(self, draft), fields(total = %draft.total))]
    pub async fn create(&self, draft: OrderDraft) -> Result<Order, CommerceError> {
        let created = self.db.add_as(ORDERS, &draft).await?;
        info!(order_id = %created.id, "order created");
        Ok(draft.into_order(created))
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order, CommerceError> {
        self.db
            .get_as(ORDERS, id.as_str())
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Result<Vec<Order>, CommerceError> {
        let mut orders: Vec<Order> = self.db.list_as(ORDERS).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Record a successful payment. Applies only while payment is pending.
    #[instrument(skip(self), fields(order_id = %id, reference = %reference))]
    pub async fn mark_paid(
        &self,
        id: &OrderId,
        reference: &PaymentReference,
    ) -> Result<(), CommerceError> {
        let applied = self
            .db
            .update_if(
                ORDERS,
                id.as_str(),
                &pending_payment(),
                fields! {
                    "paymentStatus" => PaymentStatus::Paid.as_str(),
                    "paymentReference" => reference.as_str(),
                },
            )
            .await
            .map_err(|e| order_error(id, e))?;

        if !applied {
            return Err(self.rejected_transition(id, PaymentStatus::Paid).await);
        }
        info!("payment recorded");
        Ok(())
    }

    /// Record a dismissed or abandoned payment. Applies only while payment
    /// is pending.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn mark_payment_failed(&self, id: &OrderId) -> Result<(), CommerceError> {
        let applied = self
            .db
            .update_if(
                ORDERS,
                id.as_str(),
                &pending_payment(),
                fields! {
                    "status" => OrderStatus::Cancelled.as_str(),
                    "paymentStatus" => PaymentStatus::Failed.as_str(),
                },
            )
            .await
            .map_err(|e| order_error(id, e))?;

        if !applied {
            return Err(self.rejected_transition(id, PaymentStatus::Failed).await);
        }
        info!("payment marked failed");
        Ok(())
    }

    /// Overwrite the fulfillment status.
    pub async fn set_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), CommerceError> {
        self.db
            .update(ORDERS, id.as_str(), fields! { "status" => status.as_str() })
            .await
            .map_err(|e| order_error(id, e))
    }

    async fn rejected_transition(&self, id: &OrderId, to: PaymentStatus) -> CommerceError {
        match self.get(id).await {
            Ok(order) => {
                warn!(from = %order.payment_status, %to, "payment transition refused");
                CommerceError::InvalidTransition {
                    from: order.payment_status.to_string(),
                    to: to.to_string(),
                }
            }
            Err(e) => e,
        }
    }
}

fn pending_payment() -> Precondition {
    Precondition::new("paymentStatus", PaymentStatus::Pending.as_str())
}

fn order_error(id: &OrderId, e: DbError) -> CommerceError {
    if e.is_not_found() {
        CommerceError::OrderNotFound(id.to_string())
    } else {
        e.into()
    }
}
