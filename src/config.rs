//! Runtime configuration loaded from environment variables.
//!
//! `main` loads `.env` through `dotenvy` first, so every key may also come
//! from that file. Missing or unparseable values fall back to defaults.

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite://hestia.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_WEB_DIR: &str = "web";
const DEFAULT_LAYOUT_FLUSH_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HestiaConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Static frontend served for every non-API path.
    pub web_dir: PathBuf,
    /// Sleep between persistence flush cycles.
    pub flush_interval_ms: u64,
}

impl HestiaConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1),
            web_dir: PathBuf::from(env_string("HESTIA_WEB_DIR", DEFAULT_WEB_DIR)),
            flush_interval_ms: env_parse("LAYOUT_FLUSH_INTERVAL_MS", DEFAULT_LAYOUT_FLUSH_INTERVAL_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
