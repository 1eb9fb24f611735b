//! Marketplace settings loading from config.toml
//!
//! This module loads the marketplace configuration file and seeds the
//! `system_state` table with the platform deduction rate on first run.
//! Seeding never overwrites an existing value: rate changes made at runtime
//! apply prospectively and must not be clobbered by a restart.

use crate::core::settings::{DEDUCTION_RATE_KEY, get_setting, set_setting};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct MarketplaceConfig {
    /// Platform fee percentage charged on completed orders and trades (0-100)
    pub deduction_rate: Decimal,
}

/// Loads marketplace configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The deduction rate is outside 0-100
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MarketplaceConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let config: MarketplaceConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.deduction_rate < Decimal::ZERO || config.deduction_rate > Decimal::from(100) {
        return Err(Error::Config {
            message: format!(
                "deduction_rate must be between 0 and 100, got {}",
                config.deduction_rate
            ),
        });
    }

    Ok(config)
}

/// Loads marketplace configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<MarketplaceConfig> {
    load_config("config.toml")
}

/// Seeds the settings store from the configuration file.
///
/// The deduction rate is written only when no value exists yet, so runtime
/// changes survive restarts.
pub async fn seed_settings(db: &DatabaseConnection, config: &MarketplaceConfig) -> Result<()> {
    if get_setting(db, DEDUCTION_RATE_KEY).await?.is_none() {
        set_setting(db, DEDUCTION_RATE_KEY, &config.deduction_rate.to_string()).await?;
        info!(
            "Seeded deduction rate from config: {}%",
            config.deduction_rate
        );
    }
    Ok(())
}
