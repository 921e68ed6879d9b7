//! Dashboard figures.

use anyhow::Result;
use express_commerce::dashboard::Dashboard;

use crate::context::Context;

/// Run the stats command.
pub async fn run(ctx: &Context) -> Result<()> {
    let stats = Dashboard::new(ctx.db()?, ctx.clock()).stats().await?;

    if ctx.output.is_json() {
        ctx.output.json(&stats);
        return Ok(());
    }

    ctx.output.header("Dashboard");
    ctx.output.kv("orders", &stats.total_orders.to_string());
    ctx.output
        .kv("awaiting payment", &stats.awaiting_payment.to_string());
    ctx.output.kv("units in stock", &stats.units_in_stock.to_string());
    ctx.output.kv("active coupons", &stats.active_coupons.to_string());
    Ok(())
}
