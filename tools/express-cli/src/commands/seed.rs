//! Load products and coupons into the store.

use std::fs;

use anyhow::{Context as _, Result};
use chrono::{Duration, Utc};
use express_commerce::catalog::{Catalog, Product};
use express_commerce::coupon::{normalize_code, Coupon, DiscountValue, COUPONS};
use express_commerce::{Currency, Money, ProductId};
use serde::Deserialize;
use tracing::{debug, info};

use super::SeedArgs;
use crate::context::Context;

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let mut data = match args.file {
        Some(path) => {
            let path = ctx.cwd.join(path);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => demo_data(ctx.config.store.currency),
    };
    normalize_coupons(&mut data);

    let db = ctx.db()?;
    let catalog = Catalog::new(db.clone());
    for product in &data.products {
        catalog.upsert(product).await?;
        debug!(product_id = %product.id, stock = product.stock, "product seeded");
    }
    for coupon in &data.coupons {
        db.set_as(COUPONS, &coupon.code, coupon).await?;
        debug!(code = %coupon.code, active = coupon.active, "coupon seeded");
    }

    info!(
        products = data.products.len(),
        coupons = data.coupons.len(),
        "store seeded"
    );
    ctx.output.success(&format!(
        "Seeded {} product(s) and {} coupon(s)",
        data.products.len(),
        data.coupons.len()
    ));
    Ok(())
}

/// Store coupons under the same form of code that lookups use.
fn normalize_coupons(data: &mut SeedData) {
    for coupon in &mut data.coupons {
        coupon.code = normalize_code(&coupon.code);
    }
}

fn demo_data(currency: Currency) -> SeedData {
    let money = |major: i64| Money::from_decimal(major as f64, currency);
    let product = |id: &str, name: &str, mrp: i64, price: i64, stock: i64, visible: bool| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: money(mrp),
        selling_price: money(price),
        stock,
        image_ref: format!("images/{}.png", id),
        visible,
    };
    let expiry = Utc::now() + Duration::days(30);

    SeedData {
        products: vec![
            product("paracetamol-500", "Paracetamol 500mg", 45, 40, 120, true),
            product("cetirizine-10", "Cetirizine 10mg", 30, 25, 60, true),
            product("vitamin-c", "Vitamin C 1000mg", 320, 280, 15, true),
            product("insulin-pen", "Insulin Pen", 950, 900, 2, true),
            product("thermometer", "Digital Thermometer", 250, 199, 0, true),
            product("bp-monitor", "BP Monitor", 2400, 1999, 5, false),
        ],
        coupons: vec![
            Coupon {
                code: "SAVE10".to_string(),
                discount: DiscountValue::Percentage(10.0),
                min_cart_value: money(100),
                expiry,
                active: true,
            },
            Coupon {
                code: "FLAT50".to_string(),
                discount: DiscountValue::Fixed(money(50)),
                min_cart_value: money(500),
                expiry,
                active: true,
            },
            Coupon {
                code: "WELCOME".to_string(),
                discount: DiscountValue::Percentage(20.0),
                min_cart_value: money(0),
                expiry,
                active: false,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_sellable() {
        let data = demo_data(Currency::INR);
        let offered = data.products.iter().filter(|p| p.is_purchasable()).count();
        assert_eq!(offered, 4);
        assert!(data
            .products
            .iter()
            .all(|p| p.selling_price.minor_units <= p.price.minor_units));
    }

    #[test]
    fn test_seed_file_shape() {
        let data: SeedData = serde_json::from_str(
            r#"{
                "products": [{
                    "id": "aspirin",
                    "name": "Aspirin",
                    "price": {"minorUnits": 1500, "currency": "INR"},
                    "sellingPrice": {"minorUnits": 1200, "currency": "INR"},
                    "stock": 3,
                    "visible": true
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(data.products[0].id, ProductId::new("aspirin"));
        assert!(data.coupons.is_empty());
    }

    #[test]
    fn test_seeded_coupon_codes_match_lookup_form() {
        let mut data: SeedData = serde_json::from_str(
            r#"{
                "coupons": [{
                    "id": " save10 ",
                    "discount": {"kind": "percentage", "value": 10.0},
                    "minCartValue": {"minorUnits": 10000, "currency": "INR"},
                    "expiry": "2030-01-01T00:00:00Z",
                    "active": true
                }]
            }"#,
        )
        .unwrap();
        normalize_coupons(&mut data);
        assert_eq!(data.coupons[0].code, "SAVE10");
        assert_eq!(data.coupons[0].code, normalize_code("Save10"));
    }
}
