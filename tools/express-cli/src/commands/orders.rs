//! Order listing and fulfillment status.

use anyhow::{anyhow, Result};
use express_commerce::checkout::{Order, OrderRecords, OrderStatus};
use express_commerce::status::OrderStatusManager;
use express_commerce::OrderId;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{short_id, status_badge};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(OrdersCommand::List) | None => list_orders(args.limit, ctx).await,
        Some(OrdersCommand::Show { order }) => show_order(&order, ctx).await,
        Some(OrdersCommand::SetStatus { order, status }) => {
            set_status(&order, &status, ctx).await
        }
    }
}

async fn list_orders(limit: Option<usize>, ctx: &Context) -> Result<()> {
    let mut orders = OrderStatusManager::new(ctx.db()?).list().await?;
    if let Some(limit) = limit {
        orders.truncate(limit);
    }

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Orders");
    if orders.is_empty() {
        ctx.output.info("No orders yet.");
        return Ok(());
    }

    let widths = [14, 18, 20, 12, 12, 10];
    ctx.output.table_row(
        &["ID", "CREATED", "CUSTOMER", "TOTAL", "STATUS", "PAYMENT"],
        &widths,
    );
    for order in &orders {
        ctx.output.table_row(
            &[
                short_id(order.id.as_str()),
                &order.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &order.customer.name,
                &order.total.display(),
                &status_badge(order.status.as_str()),
                &status_badge(order.payment_status.as_str()),
            ],
            &widths,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} order(s)", orders.len()));

    Ok(())
}

async fn show_order(id: &str, ctx: &Context) -> Result<()> {
    let order = OrderRecords::new(ctx.db()?).get(&OrderId::new(id)).await?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    print_order(&order, ctx);
    Ok(())
}

fn print_order(order: &Order, ctx: &Context) {
    ctx.output.header(&format!("Order {}", order.id));
    ctx.output.kv("created", &order.created_at.to_rfc3339());
    ctx.output.kv("customer", &order.customer.name);
    ctx.output.kv("email", &order.customer.email);
    ctx.output.kv("phone", &order.customer.phone);
    ctx.output.kv("address", &order.customer.address);
    ctx.output.kv("status", &status_badge(order.status.as_str()));
    ctx.output
        .kv("payment", &status_badge(order.payment_status.as_str()));
    if let Some(reference) = &order.payment_reference {
        ctx.output.kv("reference", reference.as_str());
    }

    ctx.output.info("");
    for line in &order.items {
        ctx.output.list_item(&format!(
            "{} x{} @ {}",
            line.name,
            line.quantity,
            line.unit_price.display()
        ));
    }
    ctx.output.info("");
    ctx.output.kv("subtotal", &order.subtotal.display());
    if let Some(code) = &order.coupon_code {
        ctx.output.kv(
            &format!("discount ({})", code),
            &format!("-{}", order.discount.display()),
        );
    }
    ctx.output.kv("total", &order.total.display());
}

async fn set_status(id: &str, status: &str, ctx: &Context) -> Result<()> {
    let status = OrderStatus::from_name(status).ok_or_else(|| {
        let names: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        anyhow!("Unknown status '{}'. Expected one of: {}", status, names.join(", "))
    })?;

    OrderStatusManager::new(ctx.db()?)
        .set_status(&OrderId::new(id), status)
        .await?;
    ctx.output
        .success(&format!("Order {} is now {}.", id, status_badge(status.as_str())));
    Ok(())
}
