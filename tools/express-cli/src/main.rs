//! Express CLI - drive the storefront checkout from the terminal.
//!
//! Commands:
//! - `express seed` - Load products and coupons
//! - `express products` - List what the storefront offers
//! - `express cart` - Add, change, remove and show cart lines
//! - `express coupon` - Apply or remove a coupon code
//! - `express checkout` - Place an order and run the payment step
//! - `express orders` - List orders and set fulfillment status
//! - `express stats` - Dashboard figures
//! - `express config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use express_commerce::CommerceError;
use tracing_subscriber::EnvFilter;

use commands::{
    CartArgs, CheckoutArgs, ConfigArgs, CouponArgs, OrdersArgs, ProductsArgs, SeedArgs,
};

/// Express CLI - storefront cart and checkout
#[derive(Parser)]
#[command(name = "express")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load products and coupons into the store
    Seed(SeedArgs),

    /// List products
    Products(ProductsArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Apply or remove a coupon
    Coupon(CouponArgs),

    /// Place an order for the cart
    Checkout(CheckoutArgs),

    /// List orders and update their status
    Orders(OrdersArgs),

    /// Show dashboard figures
    Stats,

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Coupon(args) => commands::coupon::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Stats => commands::stats::run(&ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        // Storefront errors carry a short notice; anything else prints in full.
        match e.downcast_ref::<CommerceError>() {
            Some(commerce) => {
                ctx.output.error(&commerce.notice());
                ctx.output.debug(&format!("{} ({:?})", commerce, commerce.kind()));
            }
            None => ctx.output.error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }

    Ok(())
}
