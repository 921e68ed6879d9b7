//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use express_commerce::config::{generate_default_config, CommerceConfig};
use express_commerce::pricing::NegativeTotalPolicy;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { name, force } => init_config(&name, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let config = &ctx.config;
    ctx.output.info("[store]");
    ctx.output.kv("name", &config.store.name);
    ctx.output.kv("currency", config.store.currency.code());

    ctx.output.info("[gateway]");
    let key = if config.gateway.key.is_empty() {
        "(unset)"
    } else {
        config.gateway.key.as_str()
    };
    ctx.output.kv("key", key);
    ctx.output.kv("theme_color", &config.gateway.theme_color);

    ctx.output.info("[checkout]");
    match config.checkout.payment_timeout_secs {
        Some(secs) => ctx.output.kv("payment_timeout_secs", &secs.to_string()),
        None => ctx.output.kv("payment_timeout_secs", "(none)"),
    }

    ctx.output.info("[pricing]");
    ctx.output.kv(
        "negative_total",
        match config.pricing.negative_total {
            NegativeTotalPolicy::Clamp => "clamp",
            NegativeTotalPolicy::Allow => "allow",
        },
    );

    ctx.output.info("[stock]");
    ctx.output.kv("mode", &format!("{:?}", config.stock.mode));
    ctx.output
        .kv("max_attempts", &config.stock.max_attempts.to_string());

    ctx.output.info("[storage]");
    ctx.output.kv("namespace", &config.storage.namespace);
    ctx.output
        .kv("data_dir", &ctx.data_dir().display().to_string());

    Ok(())
}

fn init_config(name: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("express.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config(name))?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");
    Ok(())
}

fn check(config: &CommerceConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.store.name.trim().is_empty() {
        errors.push("store.name is required".to_string());
    }
    if config.storage.namespace.trim().is_empty() {
        errors.push("storage.namespace is required".to_string());
    }
    if config.stock.max_attempts == 0 {
        warnings.push("stock.max_attempts is 0; one attempt will be made".to_string());
    }
    if config.gateway.key.is_empty() {
        warnings.push("gateway.key is not set".to_string());
    }
    if !config.gateway.theme_color.starts_with('#') {
        warnings.push(format!(
            "gateway.theme_color '{}' is not a hex color",
            config.gateway.theme_color
        ));
    }
    if config.pricing.negative_total == NegativeTotalPolicy::Allow {
        warnings.push(
            "pricing.negative_total = \"allow\" makes checkout refuse over-discounted carts"
                .to_string(),
        );
    }
    if config.checkout.payment_timeout_secs == Some(0) {
        warnings.push("checkout.payment_timeout_secs = 0 abandons every payment".to_string());
    }

    (errors, warnings)
}
