use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use time::Date;

use crate::domain::journal::DEFAULT_EPOCH;
use crate::domain::timestamp;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_idle_timeout_seconds: u64,
    pub db_max_lifetime_seconds: u64,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub journal_epoch: Date,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        Ok(Self {
            http_addr,
            database_url: env_or("DATABASE_URL", "sqlite:neighborhood.db?mode=rwc"),
            db_max_connections: env_or_parse("DB_MAX_CONNECTIONS", "5")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_idle_timeout_seconds: env_or_parse("DB_IDLE_TIMEOUT_SECONDS", "300")?,
            db_max_lifetime_seconds: env_or_parse("DB_MAX_LIFETIME_SECONDS", "1800")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "./uploads")),
            upload_max_bytes: env_or_parse("UPLOAD_MAX_BYTES", "33554432")?,
            journal_epoch: env_date("JOURNAL_EPOCH", DEFAULT_EPOCH)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

fn env_date(key: &str, default: Date) -> Result<Date> {
    match std::env::var(key) {
        Ok(value) => timestamp::parse_date(&value)
            .ok_or_else(|| anyhow!("invalid {}: expected YYYY-MM-DD", key)),
        Err(_) => Ok(default),
    }
}
