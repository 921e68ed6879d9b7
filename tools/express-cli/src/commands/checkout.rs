//! Checkout command.
//!
//! Runs the real checkout flow against a scripted payment sheet so a
//! terminal session can play the customer's side of the gateway.

use std::sync::Arc;

use anyhow::Result;
use express_commerce::checkout::{
    CheckoutOrchestrator, CheckoutOutcome, Customer, GatewayScript, ScriptedGateway,
};
use express_commerce::PaymentReference;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;

use super::{CheckoutArgs, PaymentResult};
use crate::context::Context;
use crate::output::status_badge;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart()?;
    let customer = Customer {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
    };

    let script = match args.outcome {
        PaymentResult::Paid => GatewayScript::Succeed(PaymentReference::new(
            args.reference.unwrap_or_else(generate_reference),
        )),
        PaymentResult::Dismiss => GatewayScript::Dismiss,
        PaymentResult::Abandon => GatewayScript::Hold,
        PaymentResult::Unreachable => GatewayScript::Unreachable,
    };
    let gateway = Arc::new(ScriptedGateway::new(script));
    let checkout = CheckoutOrchestrator::new(
        ctx.db()?,
        gateway.clone(),
        ctx.clock(),
        ctx.config.clone(),
    );

    let pending = checkout.begin(&mut cart, customer).await?;
    let order_id = pending.order().id.clone();
    ctx.output.info(&format!(
        "Order {} placed for {}; opening payment.",
        order_id,
        pending.order().total.display()
    ));
    if args.outcome == PaymentResult::Abandon {
        gateway.end_session(&order_id);
    }

    let outcome = checkout.complete(pending, &mut cart).await?;

    if ctx.output.is_json() {
        ctx.output.json(&match &outcome {
            CheckoutOutcome::Paid(confirmation) => json!({
                "state": outcome.state(),
                "confirmation": confirmation,
            }),
            CheckoutOutcome::Cancelled { order_id, reason } => json!({
                "state": outcome.state(),
                "orderId": order_id,
                "reason": reason,
            }),
        });
        return Ok(());
    }

    match outcome {
        CheckoutOutcome::Paid(confirmation) => {
            ctx.output.success(&format!(
                "Payment of {} received. Order {} is confirmed.",
                confirmation.amount.display(),
                confirmation.order_id
            ));
            ctx.output
                .kv("payment reference", confirmation.payment_reference.as_str());
            for adjustment in &confirmation.reconciliation.adjusted {
                ctx.output.debug(&format!(
                    "stock {}: {} -> {}",
                    adjustment.product_id, adjustment.previous, adjustment.current
                ));
            }
            for failure in &confirmation.reconciliation.failures {
                ctx.output.warn(&format!(
                    "Stock for {} was not updated: {}",
                    failure.product_id, failure.error
                ));
            }
        }
        CheckoutOutcome::Cancelled { order_id, reason } => {
            ctx.output.warn(reason.notice());
            ctx.output.kv("order", order_id.as_str());
            ctx.output.kv("status", &status_badge("Cancelled"));
            ctx.output.info("Your cart was kept. Run `express checkout` to try again.");
        }
    }

    Ok(())
}

fn generate_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(14)
        .map(char::from)
        .collect();
    format!("pay_{}", suffix)
}
