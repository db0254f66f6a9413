use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::{MarketParameters, WalletSet, DEFAULT_LOG_CAPACITY};
use crate::error::MeshError;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub settlement: SettlementConfig,
    pub covenant: CovenantConfig,
    pub defaults: DefaultsConfig,
    /// Number of event log entries kept in memory (default: 50)
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// HTTP port (default: 8000)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Fees and cadence of the settlement loop
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Seconds between settlement ticks
    pub interval_secs: u64,
    /// Paid treasury -> data every tick
    pub data_fee: Decimal,
    /// Health-check fee while occupancy is above the threshold
    pub healthy_risk_fee: Decimal,
    /// Health-check fee otherwise
    pub distressed_risk_fee: Decimal,
    /// Occupancy above which the cheaper health check applies
    pub high_occupancy_threshold: Decimal,
}

impl SettlementConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Health-check fee for the given market
    pub fn risk_fee(&self, market: &MarketParameters) -> Decimal {
        if market.is_high_occupancy(self.high_occupancy_threshold) {
            self.healthy_risk_fee
        } else {
            self.distressed_risk_fee
        }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            data_fee: dec!(0.01),
            healthy_risk_fee: dec!(0.05),
            distressed_risk_fee: dec!(0.50),
            high_occupancy_threshold: dec!(0.8),
        }
    }
}

/// Loan covenant terms used for the DSCR check
#[derive(Debug, Clone, Deserialize)]
pub struct CovenantConfig {
    /// DSCR below this engages safe mode
    pub dscr_threshold: Decimal,
    pub gross_rent_base: Decimal,
    pub expense_ratio: Decimal,
    pub debt_base: Decimal,
}

impl Default for CovenantConfig {
    fn default() -> Self {
        Self {
            dscr_threshold: dec!(1.10),
            gross_rent_base: dec!(100),
            expense_ratio: dec!(0.5),
            debt_base: dec!(40),
        }
    }
}

/// Starting values, also restored (partially) by a reset
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    pub occupancy: Decimal,
    pub rent_price: Decimal,
    pub interest_rate: Decimal,
    pub treasury: Decimal,
    pub covenant: Decimal,
    pub data: Decimal,
    /// DSCR reported before the first health check
    pub dscr: Decimal,
}

impl DefaultsConfig {
    pub fn market(&self) -> MarketParameters {
        MarketParameters::new(self.occupancy, self.rent_price, self.interest_rate)
    }

    pub fn wallets(&self) -> WalletSet {
        WalletSet::new(self.treasury, self.covenant, self.data)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let market = MarketParameters::default();
        Self {
            occupancy: market.occupancy,
            rent_price: market.rent_price,
            interest_rate: market.interest_rate,
            treasury: dec!(5000.0),
            covenant: Decimal::ZERO,
            data: Decimal::ZERO,
            dscr: dec!(1.5),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values; decimals as strings keep them exact
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("settlement.interval_secs", 3)?
            .set_default("settlement.data_fee", "0.01")?
            .set_default("settlement.healthy_risk_fee", "0.05")?
            .set_default("settlement.distressed_risk_fee", "0.50")?
            .set_default("settlement.high_occupancy_threshold", "0.8")?
            .set_default("covenant.dscr_threshold", "1.10")?
            .set_default("covenant.gross_rent_base", "100")?
            .set_default("covenant.expense_ratio", "0.5")?
            .set_default("covenant.debt_base", "40")?
            .set_default("defaults.occupancy", "0.95")?
            .set_default("defaults.rent_price", "50")?
            .set_default("defaults.interest_rate", "0.05")?
            .set_default("defaults.treasury", "5000.0")?
            .set_default("defaults.covenant", "0")?
            .set_default("defaults.data", "0")?
            .set_default("defaults.dscr", "1.5")?
            .set_default("log_capacity", DEFAULT_LOG_CAPACITY as u64)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MESH_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MESH_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("MESH")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load and validate, folding every validation failure into one error
    pub fn load_checked<P: AsRef<Path>>(config_dir: P) -> crate::Result<Self> {
        let config = Self::load_from(config_dir)?;
        config
            .validate()
            .map_err(|errors| MeshError::InvalidConfig(errors.join("; ")))?;
        Ok(config)
    }

    /// Built-in configuration, identical to loading with no files or env overrides
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            settlement: SettlementConfig::default(),
            covenant: CovenantConfig::default(),
            defaults: DefaultsConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.settlement.interval_secs == 0 {
            errors.push("settlement.interval_secs must be positive".to_string());
        }

        for (name, fee) in [
            ("settlement.data_fee", self.settlement.data_fee),
            ("settlement.healthy_risk_fee", self.settlement.healthy_risk_fee),
            (
                "settlement.distressed_risk_fee",
                self.settlement.distressed_risk_fee,
            ),
        ] {
            if fee.is_sign_negative() && !fee.is_zero() {
                errors.push(format!("{name} must not be negative"));
            }
        }

        if self.covenant.debt_base <= Decimal::ZERO {
            errors.push("covenant.debt_base must be positive".to_string());
        }

        if self.log_capacity == 0 {
            errors.push("log_capacity must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn test_load_without_files_matches_defaults() {
        let loaded = AppConfig::load_from("does/not/exist").unwrap();
        let builtin = AppConfig::default_config();

        assert_eq!(loaded.server.port, builtin.server.port);
        assert_eq!(loaded.settlement.data_fee, builtin.settlement.data_fee);
        assert_eq!(
            loaded.settlement.distressed_risk_fee,
            builtin.settlement.distressed_risk_fee
        );
        assert_eq!(
            loaded.covenant.dscr_threshold,
            builtin.covenant.dscr_threshold
        );
        assert_eq!(loaded.defaults.treasury, builtin.defaults.treasury);
        assert_eq!(loaded.log_capacity, 50);
    }

    #[test]
    fn test_risk_fee_by_occupancy() {
        let settlement = SettlementConfig::default();

        let healthy = MarketParameters::new(dec!(0.95), dec!(50), dec!(0.05));
        assert_eq!(settlement.risk_fee(&healthy), dec!(0.05));

        let distressed = MarketParameters::new(dec!(0.8), dec!(50), dec!(0.05));
        assert_eq!(settlement.risk_fee(&distressed), dec!(0.50));
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = AppConfig::default_config();
        config.settlement.interval_secs = 0;
        config.settlement.data_fee = dec!(-0.01);
        config.covenant.debt_base = Decimal::ZERO;
        config.log_capacity = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
