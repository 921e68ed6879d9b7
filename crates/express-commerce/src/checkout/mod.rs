//! Checkout module.
//!
//! Contains order records, the payment gateway adapter and the checkout
//! state machine.

mod flow;
mod gateway;
mod order;

pub use flow::{
    CancelReason, CheckoutOrchestrator, CheckoutOutcome, CheckoutState, Confirmation,
    PendingCheckout,
};
pub use gateway::{
    GatewayScript, PaymentCallback, PaymentGateway, PaymentOutcome, PaymentRequest, Prefill,
    ScriptedGateway,
};
pub use order::{
    Customer, Order, OrderDraft, OrderRecords, OrderStatus, PaymentStatus, ORDERS,
};
