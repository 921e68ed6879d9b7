//! Storefront configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::money::Currency;
use crate::pricing::{NegativeTotalPolicy, PricingPolicy};
use crate::stock::ReconcileMode;
use crate::CommerceError;

/// Configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Merchant identity.
    #[serde(default)]
    pub store: StoreConfig,

    /// Payment gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Checkout behavior.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Totals computation.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Stock reconciliation.
    #[serde(default)]
    pub stock: StockConfig,

    /// Where state is kept.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CommerceConfig {
    /// Load config from a file; `.json` is parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                CommerceError::Config(format!("failed to parse JSON {}: {}", path.display(), e))
            })
        } else {
            toml::from_str(&content).map_err(|e| {
                CommerceError::Config(format!("failed to parse TOML {}: {}", path.display(), e))
            })
        }
    }

    /// Save config to a file in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommerceError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self).map_err(|e| CommerceError::Config(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|e| {
            CommerceError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// Pricing policy for totals.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            currency: self.store.currency,
            negative_total: self.pricing.negative_total,
        }
    }

    /// How long to wait for a gateway callback, if bounded.
    pub fn payment_timeout(&self) -> Option<Duration> {
        self.checkout.payment_timeout_secs.map(Duration::from_secs)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// Merchant identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name shown on the payment sheet.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency for prices and payments.
    #[serde(default)]
    pub currency: Currency,
}

fn default_store_name() -> String {
    "Pharma Express".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            currency: Currency::default(),
        }
    }
}

/// Payment gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Public key handed to the gateway.
    #[serde(default)]
    pub key: String,

    /// Accent color for the payment sheet.
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
}

fn default_theme_color() -> String {
    "#007bff".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            theme_color: default_theme_color(),
        }
    }
}

/// Checkout behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Seconds to wait for a gateway callback before treating the attempt
    /// as abandoned. Unset waits until the callback fires or is dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_timeout_secs: Option<u64>,
}

/// Totals computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub negative_total: NegativeTotalPolicy,
}

/// Stock reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    #[serde(default)]
    pub mode: ReconcileMode,

    /// Conditional-write attempts per product before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    5
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Where state is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix for client-local keys.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory for file-backed stores, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_namespace() -> String {
    "express".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            data_dir: None,
        }
    }
}

/// Generate a default `express.toml`.
pub fn generate_default_config(store_name: &str) -> String {
    format!(
        r##"# Express Commerce storefront configuration

[store]
name = "{store_name}"
currency = "INR"

[gateway]
key = ""
theme_color = "#007bff"

[checkout]
# Treat an unanswered payment sheet as abandoned after this many seconds.
# payment_timeout_secs = 900

[pricing]
# "clamp" caps a fixed discount at the subtotal; "allow" lets totals go negative.
negative_total = "clamp"

[stock]
# "compare-and-swap" or "read-modify-write"
mode = "compare-and-swap"
max_attempts = 5

[storage]
namespace = "express"
data_dir = ".express"
"##
    )
}
