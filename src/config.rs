use anyhow::{bail, Result};
use std::{env, path::PathBuf, str::FromStr};

/// Which implementation backs the per-user storage ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres,
    Memory,
}

impl FromStr for LedgerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(LedgerBackend::Postgres),
            "memory" => Ok(LedgerBackend::Memory),
            other => bail!("Unsupported ledger backend: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub ledger_backend: LedgerBackend,
    pub run_migrations: bool,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub max_file_size: usize,
    pub signed_url_ttl_secs: u64,
    pub storage_limit_bytes: i64,
    pub list_limit: usize,
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "postgresql://localhost/cloud_drive".to_string(),
            port: 3000,
            ledger_backend: LedgerBackend::Postgres,
            run_migrations: true,
            storage_dir: PathBuf::from("./storage"),
            public_base_url: "http://localhost:3000".to_string(),
            jwt_secret: "your-secret-key".to_string(),
            jwt_issuer: None,
            max_file_size: 100 * 1024 * 1024, // 100MB
            signed_url_ttl_secs: 3600,
            storage_limit_bytes: 5 * 1024 * 1024 * 1024, // 5GB
            list_limit: 100,
            recent_limit: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_var("PORT", defaults.port)?,
            ledger_backend: parse_var("LEDGER_BACKEND", defaults.ledger_backend)?,
            run_migrations: parse_var("RUN_MIGRATIONS", defaults.run_migrations)?,
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_issuer: env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
            max_file_size: parse_var("MAX_FILE_SIZE", defaults.max_file_size)?,
            signed_url_ttl_secs: parse_var("SIGNED_URL_TTL_SECS", defaults.signed_url_ttl_secs)?,
            storage_limit_bytes: parse_var("STORAGE_LIMIT_BYTES", defaults.storage_limit_bytes)?,
            list_limit: parse_var("LIST_LIMIT", defaults.list_limit)?,
            recent_limit: parse_var("RECENT_LIMIT", defaults.recent_limit)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
