//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupon;
pub mod orders;
pub mod products;
pub mod seed;
pub mod stats;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// JSON file with `products` and `coupons` arrays (default: demo data).
    #[arg(short, long)]
    pub file: Option<String>,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Include hidden and out-of-stock products.
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart lines and totals.
    Show,
    /// Add a product to the cart.
    Add {
        /// Product ID.
        product: String,
        /// Units to add.
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Change a line's quantity by a signed amount.
    Change {
        /// Product ID.
        product: String,
        /// Amount to add (negative to subtract).
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        product: String,
    },
    /// Empty the cart and drop its coupon.
    Clear,
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    #[command(subcommand)]
    pub command: CouponCommand,
}

#[derive(Subcommand)]
pub enum CouponCommand {
    /// Validate a code and attach it to the cart.
    Apply {
        /// Coupon code (case-insensitive).
        code: String,
    },
    /// Detach the applied coupon.
    Remove,
}

/// How the simulated payment sheet ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PaymentResult {
    /// The customer pays.
    Paid,
    /// The customer closes the sheet.
    Dismiss,
    /// The session ends without a callback.
    Abandon,
    /// The gateway cannot be reached.
    Unreachable,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Customer name.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Customer email.
    #[arg(long, default_value = "")]
    pub email: String,

    /// Customer phone.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Delivery address.
    #[arg(long, default_value = "")]
    pub address: String,

    /// How the payment step ends.
    #[arg(long, value_enum, default_value = "paid")]
    pub outcome: PaymentResult,

    /// Payment reference to report on success (default: generated).
    #[arg(long)]
    pub reference: Option<String>,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,

    /// Show only the last N orders.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List orders, newest first.
    List,
    /// Show one order.
    Show {
        /// Order ID.
        order: String,
    },
    /// Set an order's fulfillment status.
    SetStatus {
        /// Order ID.
        order: String,
        /// Pending, Shipped, Delivered or Cancelled.
        status: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Store name.
        #[arg(short, long, default_value = "Pharma Express")]
        name: String,
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
