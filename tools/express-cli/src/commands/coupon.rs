//! Coupon commands.

use anyhow::Result;
use express_commerce::coupon::{CouponValidator, DiscountValue};

use super::{cart, CouponArgs, CouponCommand};
use crate::context::Context;

/// Run the coupon command.
pub async fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart()?;

    match args.command {
        CouponCommand::Apply { code } => {
            let applied = CouponValidator::new(ctx.db()?, ctx.clock())
                .apply_to_cart(&code, &mut cart)
                .await?;
            let value = match &applied.discount {
                DiscountValue::Percentage(pct) => format!("{}% off", pct),
                DiscountValue::Fixed(amount) => format!("{} off", amount.display()),
            };
            ctx.output
                .success(&format!("Coupon {} applied: {}.", applied.code, value));
        }
        CouponCommand::Remove => match cart.evict_coupon()? {
            Some(coupon) => ctx.output.success(&format!("Coupon {} removed.", coupon.code)),
            None => ctx.output.info("No coupon applied."),
        },
    }

    cart::show(&mut cart, ctx)
}
