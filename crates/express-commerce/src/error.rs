//! Commerce error types.

use thiserror::Error;

use crate::coupon::Rejection;

/// How an error should be treated at the storefront boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input or a rule the cart does not satisfy. Shown as a notice.
    Validation,
    /// The store or gateway could not be reached. Shown as a notice; the
    /// user re-triggers the action.
    Network,
    /// The payment attempt ended without success.
    Payment,
    /// Post-payment bookkeeping failed. Logged, never shown to the customer.
    Reconciliation,
    /// Corrupt data or arithmetic failure.
    Internal,
}

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Coupon could not be applied.
    #[error("Coupon rejected: {0}")]
    CouponRejected(Rejection),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A quantity change would leave a line below one unit.
    #[error("Quantity cannot go below 1; remove the item instead")]
    QuantityBelowOne,

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// Live stock no longer covers a cart line.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// The discount exceeds the subtotal and negative totals are allowed.
    #[error("Order total is negative")]
    NegativeTotal,

    /// A payment state change that does not apply to the stored order.
    #[error("Invalid payment transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Stock write kept conflicting with concurrent writers.
    #[error("Stock update for {0} conflicted {1} times")]
    StockConflict(String, u32),

    /// Payment gateway could not be opened.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Document store error.
    #[error("Database error: {0}")]
    Database(String),

    /// Client-local storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CommerceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::CouponRejected(_)
            | CommerceError::ProductNotFound(_)
            | CommerceError::OrderNotFound(_)
            | CommerceError::ItemNotInCart(_)
            | CommerceError::InvalidQuantity(_)
            | CommerceError::QuantityBelowOne
            | CommerceError::EmptyCart
            | CommerceError::CheckoutIncomplete(_)
            | CommerceError::InsufficientStock { .. }
            | CommerceError::NegativeTotal
            | CommerceError::InvalidTransition { .. } => ErrorKind::Validation,
            CommerceError::Database(_)
            | CommerceError::Storage(_)
            | CommerceError::Gateway(_) => ErrorKind::Network,
            CommerceError::StockConflict(..) => ErrorKind::Reconciliation,
            CommerceError::CurrencyMismatch { .. }
            | CommerceError::Overflow
            | CommerceError::Serialization(_)
            | CommerceError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Short message suitable for a transient storefront notice.
    pub fn notice(&self) -> String {
        match self {
            CommerceError::CouponRejected(rejection) => rejection.message(),
            CommerceError::ItemNotInCart(_) => "That item is no longer in your cart.".to_string(),
            CommerceError::QuantityBelowOne => {
                "Quantity must be at least 1. Remove the item instead.".to_string()
            }
            CommerceError::EmptyCart => "Your cart is empty.".to_string(),
            CommerceError::CheckoutIncomplete(missing) => {
                format!("Please fill in: {}.", missing)
            }
            CommerceError::InsufficientStock { available, .. } => {
                format!("Only {} units available.", available)
            }
            CommerceError::NegativeTotal => {
                "This coupon cannot be used with the current cart.".to_string()
            }
            other => match other.kind() {
                ErrorKind::Network => "Could not reach the store. Please try again.".to_string(),
                _ => other.to_string(),
            },
        }
    }
}

impl From<Rejection> for CommerceError {
    fn from(rejection: Rejection) -> Self {
        CommerceError::CouponRejected(rejection)
    }
}

impl From<express_db::DbError> for CommerceError {
    fn from(e: express_db::DbError) -> Self {
        match e {
            express_db::DbError::DeserializeError(msg) => CommerceError::Serialization(msg),
            other => CommerceError::Database(other.to_string()),
        }
    }
}

impl From<express_cache::CacheError> for CommerceError {
    fn from(e: express_cache::CacheError) -> Self {
        match e {
            express_cache::CacheError::SerializeError(e) => {
                CommerceError::Serialization(e.to_string())
            }
            other => CommerceError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
