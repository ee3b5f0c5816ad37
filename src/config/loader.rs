//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{EngineError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. `KALSHI_API_KEY_ID` / `KALSHI_PRIVATE_KEY_PATH` / `KALSHI_REST_URL`
/// 2. Environment variables (prefixed with APP_, nested with `__`)
/// 3. Configuration file (TOML format)
/// 4. Default values
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // e.g. APP_TRADING__MAX_TRADE=15
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let mut config: AppConfig = builder
        .build()
        .map_err(|e| EngineError::Configuration(e.to_string()))?
        .try_deserialize()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    apply_kalshi_env(&mut config);
    config.validate()?;
    Ok(config)
}

/// Overlay Kalshi credentials from the conventional environment variables
fn apply_kalshi_env(config: &mut AppConfig) {
    if let Ok(key) = std::env::var("KALSHI_API_KEY_ID") {
        config.kalshi.api_key_id = Some(key);
    }
    if let Ok(path) = std::env::var("KALSHI_PRIVATE_KEY_PATH") {
        config.kalshi.private_key_path = Some(path);
    }
    if let Ok(url) = std::env::var("KALSHI_REST_URL") {
        config.kalshi.rest_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Some("does/not/exist.toml")).unwrap();
        assert_eq!(config.trading.bankroll, dec!(288));
        assert!(config.trading.dry_run);
    }

    #[test]
    fn test_loads_toml_file() {
        let dir = std::env::temp_dir().join(format!("courtside-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[trading]
bankroll = 500.0
max_trade = 25.0
use_maker = false

[trading.period_gate]
excluded_periods = [1]

[settings]
poll_interval_seconds = 10
"#
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.trading.bankroll, dec!(500));
        assert_eq!(config.trading.max_trade, dec!(25));
        assert!(!config.trading.use_maker);
        assert_eq!(config.trading.period_gate.excluded_periods, vec![1]);
        assert_eq!(config.settings.poll_interval_seconds, 10);

        std::fs::remove_dir_all(&dir).ok();
    }
}
