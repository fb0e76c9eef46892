//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Tolerance;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Ledger computation settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as loaded from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Ledger computation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Tolerance for "is balanced" verdicts (trial balance, summary, reconciliation).
    #[serde(default = "default_tolerance")]
    pub balance_tolerance: Decimal,
    /// Accounts with `|balance|` at or below this are zero-balance accounts.
    #[serde(default = "default_tolerance")]
    pub zero_balance_threshold: Decimal,
    /// Journal entries shown on the account detail view.
    #[serde(default = "default_recent_entries_limit")]
    pub recent_entries_limit: u64,
    /// Expenses shown on the account detail view of expense accounts.
    #[serde(default = "default_recent_expenses_limit")]
    pub recent_expenses_limit: u64,
    /// Default page size for account listing.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Largest page size a caller may request.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

fn default_tolerance() -> Decimal {
    Tolerance::CENT.value()
}

fn default_recent_entries_limit() -> u64 {
    20
}

fn default_recent_expenses_limit() -> u64 {
    10
}

fn default_per_page() -> u32 {
    15
}

fn default_max_per_page() -> u32 {
    100
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_tolerance(),
            zero_balance_threshold: default_tolerance(),
            recent_entries_limit: default_recent_entries_limit(),
            recent_expenses_limit: default_recent_expenses_limit(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl LedgerConfig {
    /// Tolerance used for balanced verdicts. Negative values fall back to one cent.
    #[must_use]
    pub fn balance_tolerance(&self) -> Tolerance {
        Tolerance::new(self.balance_tolerance).unwrap_or_default()
    }

    /// Threshold used for zero-balance filtering. Negative values fall back to one cent.
    #[must_use]
    pub fn zero_balance_threshold(&self) -> Tolerance {
        Tolerance::new(self.zero_balance_threshold).unwrap_or_default()
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
