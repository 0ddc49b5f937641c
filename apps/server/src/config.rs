use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use freightfin_core::config::LedgerConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub ledger: LedgerConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `key` when set; an unset variable keeps `default`, a malformed one is an error.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}='{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("FF_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid FF_LISTEN_ADDR")?;
        let db_path = env_or("FF_DB_PATH", "./db/ledger.db");
        let cors_allow = env_or("FF_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_env("FF_REQUEST_TIMEOUT_MS", 30_000)?;

        let defaults = LedgerConfig::default();
        let ledger = LedgerConfig {
            platform_account_id: env_or("FF_PLATFORM_ACCOUNT_ID", &defaults.platform_account_id),
            fee_percentage: parse_env("FF_FEE_PERCENTAGE", defaults.fee_percentage)?,
            fee_bearer: parse_env("FF_FEE_BEARER", defaults.fee_bearer)?,
            default_maturity_days: parse_env(
                "FF_DEFAULT_MATURITY_DAYS",
                defaults.default_maturity_days,
            )?,
            interest_basis: parse_env("FF_INTEREST_BASIS", defaults.interest_basis)?,
            max_conflict_retries: parse_env(
                "FF_MAX_CONFLICT_RETRIES",
                defaults.max_conflict_retries,
            )?,
        };
        ledger.validate()?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            ledger,
        })
    }
}
