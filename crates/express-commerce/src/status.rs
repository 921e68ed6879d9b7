//! Admin-side fulfillment status changes.

use express_db::Db;
use tracing::{info, instrument};

use crate::checkout::{Order, OrderRecords, OrderStatus};
use crate::ids::OrderId;
use crate::CommerceError;

/// Sets an order's fulfillment status.
///
/// Any status may follow any other. Payment status and stock are never
/// touched.
#[derive(Debug, Clone)]
pub struct OrderStatusManager {
    orders: OrderRecords,
}

impl OrderStatusManager {
    pub fn new(db: Db) -> Self {
        Self {
            orders: OrderRecords::new(db),
        }
    }

    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn set_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), CommerceError> {
        self.orders.set_status(order_id, status).await?;
        info!("order status updated");
        Ok(())
    }

    /// Orders for the admin list, newest first.
    pub async fn list(&self) -> Result<Vec<Order>, CommerceError> {
        self.orders.list().await
    }
}
