//! Product listing.

use anyhow::Result;
use express_commerce::catalog::Catalog;

use super::ProductsArgs;
use crate::context::Context;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::new(ctx.db()?);
    let products = if args.all {
        catalog.all().await?
    } else {
        catalog.storefront().await?
    };

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header("Products");
    if products.is_empty() {
        ctx.output.info("No products available.");
        ctx.output.info("Run `express seed` to load the demo catalog.");
        return Ok(());
    }

    let widths = [20, 24, 12, 12, 8];
    ctx.output
        .table_row(&["ID", "NAME", "MRP", "PRICE", "STOCK"], &widths);
    for product in &products {
        let mut name = product.name.clone();
        if !product.visible {
            name.push_str(" (hidden)");
        }
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &name,
                &product.price.display(),
                &product.selling_price.display(),
                &product.stock.to_string(),
            ],
            &widths,
        );
    }

    Ok(())
}
