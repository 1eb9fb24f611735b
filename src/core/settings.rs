//! Settings business logic over the `system_state` key-value store.
//!
//! The deduction engine reads the platform fee rate through here on every
//! completion, so rate changes apply to future deductions only; rows already
//! written to the ledger are never recomputed.

use crate::{
    entities::{SystemState, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tracing::info;

/// Key under which the platform fee percentage is stored
pub const DEDUCTION_RATE_KEY: &str = "deduction_rate";

/// Fee percentage used when no rate has ever been configured
pub const DEFAULT_DEDUCTION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Reads a raw setting value, `None` if the key has never been set.
pub async fn get_setting(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    let row = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(row.map(|m| m.value))
}

/// Sets or updates a setting value (UPSERT behavior).
pub async fn set_setting(db: &DatabaseConnection, key: &str, value: &str) -> Result<()> {
    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let mut row: system_state::ActiveModel = row.into();
            row.value = Set(value.to_string());
            row.updated_at = Set(Utc::now());
            row.update(db).await?;
        }
        None => {
            let row = system_state::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            row.insert(db).await?;
        }
    }

    info!("Set system state: {} = {}", key, value);
    Ok(())
}

/// Reads the platform fee percentage, falling back to
/// [`DEFAULT_DEDUCTION_RATE`] when unset.
///
/// A stored value that does not parse as a percentage in 0-100 is a
/// configuration error, not a silent fallback: someone wrote garbage into the
/// settings store and fee charging must not guess.
pub async fn get_deduction_rate(db: &DatabaseConnection) -> Result<Decimal> {
    let Some(raw) = get_setting(db, DEDUCTION_RATE_KEY).await? else {
        return Ok(DEFAULT_DEDUCTION_RATE);
    };

    let rate: Decimal = raw.parse().map_err(|_| Error::Config {
        message: format!("Stored deduction rate is not a number: '{raw}'"),
    })?;
    validate_rate(rate)?;
    Ok(rate)
}

/// Stores a new platform fee percentage, applied prospectively.
pub async fn set_deduction_rate(db: &DatabaseConnection, rate: Decimal) -> Result<()> {
    validate_rate(rate)?;
    set_setting(db, DEDUCTION_RATE_KEY, &rate.to_string()).await
}

fn validate_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::from(100) {
        return Err(Error::Validation {
            message: format!("Deduction rate must be between 0 and 100, got {rate}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_default_rate_when_unset() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(get_deduction_rate(&db).await?, dec!(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_and_get_rate() -> Result<()> {
        let db = setup_test_db().await?;

        set_deduction_rate(&db, dec!(7.5)).await?;
        assert_eq!(get_deduction_rate(&db).await?, dec!(7.5));

        // Updating the same key replaces the value
        set_deduction_rate(&db, dec!(3)).await?;
        assert_eq!(get_deduction_rate(&db).await?, dec!(3));

        Ok(())
    }

    #[tokio::test]
    async fn test_rate_out_of_range_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(matches!(
            set_deduction_rate(&db, dec!(-1)).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            set_deduction_rate(&db, dec!(100.5)).await,
            Err(Error::Validation { .. })
        ));

        // Nothing was stored
        assert_eq!(get_setting(&db, DEDUCTION_RATE_KEY).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_stored_rate_is_config_error() -> Result<()> {
        let db = setup_test_db().await?;

        set_setting(&db, DEDUCTION_RATE_KEY, "five percent").await?;
        assert!(matches!(
            get_deduction_rate(&db).await,
            Err(Error::Config { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_generic_setting_roundtrip() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(get_setting(&db, "motd").await?, None);
        set_setting(&db, "motd", "hello").await?;
        assert_eq!(get_setting(&db, "motd").await?, Some("hello".to_string()));

        Ok(())
    }
}
