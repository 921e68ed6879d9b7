//! Post-payment stock reconciliation.
//!
//! Runs after an order is recorded as paid. Each cart line is applied to
//! its product on its own; a failure on one line is logged and reported
//! but does not undo or stop the others. Stock is never clamped, so an
//! oversold product shows up as negative stock.

use express_db::{fields, Db, DbError, Precondition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::cart::CartLine;
use crate::catalog::PRODUCTS;
use crate::config::StockConfig;
use crate::ids::ProductId;
use crate::CommerceError;

/// How stock writes are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileMode {
    /// Read, subtract, write back. Concurrent reconcilers can lose updates.
    ReadModifyWrite,
    /// Write only if stock still holds the value read; re-read and retry on
    /// conflict.
    #[default]
    CompareAndSwap,
}

/// One product's stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub previous: i64,
    pub current: i64,
    /// Writes attempted, including conflicts.
    pub attempts: u32,
}

impl StockAdjustment {
    pub fn is_oversold(&self) -> bool {
        self.current < 0
    }
}

/// A line whose stock could not be adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    pub product_id: ProductId,
    pub quantity: u32,
    pub error: String,
}

/// Result of reconciling one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub adjusted: Vec<StockAdjustment>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Deserialize)]
struct StockLevel {
    stock: i64,
}

/// Decrements product stock for purchased lines.
#[derive(Debug, Clone)]
pub struct StockReconciler {
    db: Db,
    mode: ReconcileMode,
    max_attempts: u32,
}

impl StockReconciler {
    pub fn new(db: Db, mode: ReconcileMode, max_attempts: u32) -> Self {
        Self {
            db,
            mode,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(db: Db, config: &StockConfig) -> Self {
        Self::new(db, config.mode, config.max_attempts)
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Subtract each line's quantity from its product, one line at a time.
    #[instrument(skip(self, lines), fields(mode = ?self.mode, lines = lines.len()))]
    pub async fn reconcile(&self, lines: &[CartLine]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for line in lines {
            match self.adjust(&line.product_id, line.quantity).await {
                Ok(adjustment) => {
                    if adjustment.is_oversold() {
                        warn!(
                            product_id = %adjustment.product_id,
                            stock = adjustment.current,
                            "product oversold"
                        );
                    }
                    report.adjusted.push(adjustment);
                }
                Err(e) => {
                    warn!(product_id = %line.product_id, error = %e, "stock reconciliation failed");
                    report.failures.push(ReconcileFailure {
                        product_id: line.product_id.clone(),
                        quantity: line.quantity,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            adjusted = report.adjusted.len(),
            failed = report.failures.len(),
            "stock reconciled"
        );
        report
    }

    /// Subtract `quantity` from one product's stock.
    pub async fn adjust(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, CommerceError> {
        match self.mode {
            ReconcileMode::ReadModifyWrite => self.read_modify_write(product_id, quantity).await,
            ReconcileMode::CompareAndSwap => self.compare_and_swap(product_id, quantity).await,
        }
    }

    async fn read_modify_write(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, CommerceError> {
        let previous = self.current_stock(product_id).await?;
        let current = previous
            .checked_sub(i64::from(quantity))
            .ok_or(CommerceError::Overflow)?;
        self.db
            .update(PRODUCTS, product_id.as_str(), fields! { "stock" => current })
            .await
            .map_err(|e| product_error(product_id, e))?;

        Ok(StockAdjustment {
            product_id: product_id.clone(),
            previous,
            current,
            attempts: 1,
        })
    }

    async fn compare_and_swap(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, CommerceError> {
        for attempt in 1..=self.max_attempts {
            let previous = self.current_stock(product_id).await?;
            let current = previous
                .checked_sub(i64::from(quantity))
                .ok_or(CommerceError::Overflow)?;
            let applied = self
                .db
                .update_if(
                    PRODUCTS,
                    product_id.as_str(),
                    &Precondition::new("stock", previous),
                    fields! { "stock" => current },
                )
                .await
                .map_err(|e| product_error(product_id, e))?;

            if applied {
                return Ok(StockAdjustment {
                    product_id: product_id.clone(),
                    previous,
                    current,
                    attempts: attempt,
                });
            }
            debug!(%product_id, attempt, "stock changed underneath, retrying");
        }

        Err(CommerceError::StockConflict(
            product_id.to_string(),
            self.max_attempts,
        ))
    }

    async fn current_stock(&self, product_id: &ProductId) -> Result<i64, CommerceError> {
        let level: Option<StockLevel> = self.db.get_as(PRODUCTS, product_id.as_str()).await?;
        level
            .map(|l| l.stock)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))
    }
}

fn product_error(product_id: &ProductId, e: DbError) -> CommerceError {
    if e.is_not_found() {
        CommerceError::ProductNotFound(product_id.to_string())
    } else {
        e.into()
    }
}
