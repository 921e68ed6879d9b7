//! Payment gateway adapter.
//!
//! The gateway owns its own UI and reports back exactly once, either with
//! a payment reference or with a dismissal. [`PaymentCallback`] is consumed
//! by whichever of the two fires, so a second report cannot be expressed.
//! Dropping the callback without firing it tells the waiting checkout that
//! the session ended.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::ids::{OrderId, PaymentReference};
use crate::money::Currency;
use crate::CommerceError;

/// Customer details the gateway pre-fills on its payment sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the gateway needs to open a payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub key: String,
    pub amount_minor_units: i64,
    pub currency: Currency,
    pub merchant_name: String,
    pub description: String,
    pub external_reference: OrderId,
    pub prefill: Prefill,
    pub theme_color: String,
}

/// How a payment attempt ended, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded(PaymentReference),
    Dismissed,
}

/// Single-shot continuation handed to the gateway.
pub struct PaymentCallback {
    sender: oneshot::Sender<PaymentOutcome>,
}

impl fmt::Debug for PaymentCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentCallback")
            .field("waiting", &!self.sender.is_closed())
            .finish()
    }
}

impl PaymentCallback {
    /// Create a callback and the receiver the checkout waits on.
    pub fn channel() -> (Self, oneshot::Receiver<PaymentOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Report a successful payment. Returns `false` if nobody is waiting
    /// any more.
    pub fn succeed(self, reference: PaymentReference) -> bool {
        self.sender.send(PaymentOutcome::Succeeded(reference)).is_ok()
    }

    /// Report that the customer closed the payment sheet.
    pub fn dismiss(self) -> bool {
        self.sender.send(PaymentOutcome::Dismissed).is_ok()
    }
}

/// External payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    /// Open a payment sheet. Returns once the sheet is shown; the outcome
    /// arrives later through `callback`.
    async fn open(
        &self,
        request: PaymentRequest,
        callback: PaymentCallback,
    ) -> Result<(), CommerceError>;
}

/// What a [`ScriptedGateway`] does with the next sheet it opens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GatewayScript {
    /// Report success with this reference right away.
    Succeed(PaymentReference),
    /// Report a dismissal right away.
    Dismiss,
    /// Keep the callback until `fire_*` or `end_session` is called.
    #[default]
    Hold,
    /// Fail to open.
    Unreachable,
}

/// Gateway that follows a script instead of talking to a provider.
///
/// Used by the command line driver and by tests.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<GatewayScript>,
    requests: Mutex<Vec<PaymentRequest>>,
    held: Mutex<HashMap<OrderId, PaymentCallback>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGateway {
    pub fn new(script: GatewayScript) -> Self {
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    /// Change what happens on the next `open`.
    pub fn set_script(&self, script: GatewayScript) {
        *lock(&self.script) = script;
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        lock(&self.requests).clone()
    }

    /// Fire the held callback for an order with a success.
    pub fn fire_success(&self, order_id: &OrderId, reference: PaymentReference) -> bool {
        self.take_held(order_id)
            .map_or(false, |callback| callback.succeed(reference))
    }

    /// Fire the held callback for an order with a dismissal.
    pub fn fire_dismiss(&self, order_id: &OrderId) -> bool {
        self.take_held(order_id)
            .map_or(false, PaymentCallback::dismiss)
    }

    /// Drop the held callback without firing it.
    pub fn end_session(&self, order_id: &OrderId) -> bool {
        self.take_held(order_id).is_some()
    }

    fn take_held(&self, order_id: &OrderId) -> Option<PaymentCallback> {
        lock(&self.held).remove(order_id)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn open(
        &self,
        request: PaymentRequest,
        callback: PaymentCallback,
    ) -> Result<(), CommerceError> {
        let script = lock(&self.script).clone();
        debug!(order_id = %request.external_reference, ?script, "payment sheet opened");

        if script == GatewayScript::Unreachable {
            warn!("scripted gateway unreachable");
            return Err(CommerceError::Gateway("payment gateway unreachable".to_string()));
        }

        let order_id = request.external_reference.clone();
        lock(&self.requests).push(request);

        match script {
            GatewayScript::Succeed(reference) => {
                callback.succeed(reference);
            }
            GatewayScript::Dismiss => {
                callback.dismiss();
            }
            GatewayScript::Hold => {
                lock(&self.held).insert(order_id, callback);
            }
            GatewayScript::Unreachable => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(order: &str) -> PaymentRequest {
        PaymentRequest {
            key: "rzp_test".into(),
            amount_minor_units: 18000,
            currency: Currency::INR,
            merchant_name: "Pharma Express".into(),
            description: format!("Order ID: {}", order),
            external_reference: OrderId::new(order),
            prefill: Prefill::default(),
            theme_color: "#007bff".into(),
        }
    }

    #[tokio::test]
    async fn test_callback_delivers_once() {
        let (callback, receiver) = PaymentCallback::channel();
        assert!(callback.succeed(PaymentReference::new("PAY123")));
        assert_eq!(
            receiver.await.unwrap(),
            PaymentOutcome::Succeeded(PaymentReference::new("PAY123"))
        );
    }

    #[tokio::test]
    async fn test_dropped_callback_closes_receiver() {
        let (callback, receiver) = PaymentCallback::channel();
        drop(callback);
        assert!(receiver.await.is_err());
    }

    #[tokio::test]
    async fn test_held_callback_fires_later() {
        let gateway = ScriptedGateway::new(GatewayScript::Hold);
        let (callback, receiver) = PaymentCallback::channel();
        gateway.open(request("ord-1"), callback).await.unwrap();

        assert!(!gateway.fire_dismiss(&OrderId::new("other")));
        assert!(gateway.fire_dismiss(&OrderId::new("ord-1")));
        assert_eq!(receiver.await.unwrap(), PaymentOutcome::Dismissed);
        assert!(!gateway.end_session(&OrderId::new("ord-1")));
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let gateway = ScriptedGateway::new(GatewayScript::Unreachable);
        let (callback, _receiver) = PaymentCallback::channel();
        let err = gateway.open(request("ord-1"), callback).await.unwrap_err();
        assert!(matches!(err, CommerceError::Gateway(_)));
        assert!(gateway.requests().is_empty());
    }
}
