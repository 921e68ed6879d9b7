//! Cart commands.

use anyhow::Result;
use express_commerce::cart::{AddOutcome, CartStore, ChangeOutcome, CouponStatus};
use express_commerce::catalog::Catalog;
use express_commerce::ProductId;
use serde::Serialize;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add { product, quantity } => {
            let product = Catalog::new(ctx.db()?)
                .product(&ProductId::new(product))
                .await?;
            let outcome = cart.add(&product, quantity)?;
            let notice = outcome.notice(&product.name);
            match outcome {
                AddOutcome::CapacityReached { .. } => ctx.output.warn(&notice),
                _ => ctx.output.success(&notice),
            }
        }
        CartCommand::Change { product, delta } => {
            match cart.change_quantity(&ProductId::new(product), delta)? {
                ChangeOutcome::Updated { quantity } => {
                    ctx.output.success(&format!("Quantity set to {}.", quantity))
                }
                clamped => {
                    if let Some(notice) = clamped.notice() {
                        ctx.output.warn(&notice);
                    }
                }
            }
        }
        CartCommand::Remove { product } => {
            if cart.remove(&ProductId::new(product))? {
                ctx.output.success("Item removed from cart.");
            } else {
                ctx.output.info("That item was not in your cart.");
            }
        }
        CartCommand::Clear => {
            cart.clear()?;
            ctx.output.success("Cart cleared.");
        }
    }

    show(&mut cart, ctx)
}

#[derive(Serialize)]
struct CartView<'a> {
    lines: &'a [express_commerce::cart::CartLine],
    count: u64,
    subtotal: String,
    discount: String,
    total: String,
    coupon: Option<String>,
}

/// Print the cart with freshly computed totals.
pub fn show(cart: &mut CartStore, ctx: &Context) -> Result<()> {
    let summary = cart.summary(ctx.clock().now())?;

    if let CouponStatus::Evicted { code, reason } = &summary.coupon {
        ctx.output
            .warn(&format!("Coupon {} removed: {}", code, reason.message()));
    }

    if ctx.output.is_json() {
        let coupon = match &summary.coupon {
            CouponStatus::Applied { code } => Some(code.clone()),
            _ => None,
        };
        ctx.output.json(&CartView {
            lines: cart.lines(),
            count: cart.count(),
            subtotal: summary.totals.subtotal.display(),
            discount: summary.totals.discount.display(),
            total: summary.totals.total.display(),
            coupon,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({} item(s))", cart.count()));
    if cart.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }

    let widths = [20, 24, 6, 12];
    ctx.output.table_row(&["ID", "NAME", "QTY", "AMOUNT"], &widths);
    for line in cart.lines() {
        let amount = line
            .line_total()
            .map(|m| m.display())
            .unwrap_or_else(|_| "-".to_string());
        ctx.output.table_row(
            &[
                line.product_id.as_str(),
                &line.name,
                &line.quantity.to_string(),
                &amount,
            ],
            &widths,
        );
    }

    ctx.output.info("");
    ctx.output.kv("subtotal", &summary.totals.subtotal.display());
    if let CouponStatus::Applied { code } = &summary.coupon {
        ctx.output.kv(
            &format!("discount ({})", code),
            &format!("-{}", summary.totals.discount.display()),
        );
    }
    ctx.output.kv("total", &summary.totals.total.display());

    Ok(())
}
