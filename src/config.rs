//! Runtime settings, read once from the environment at startup and injected
//! into handlers through [`crate::state::AppState`]. Nothing reads ambient
//! configuration after boot.

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:locations.db";
pub const DEFAULT_SEED_SECRET: &str = "default_secret";
pub const DEFAULT_FIXTURE_PATH: &str = "db.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct Settings {
    /// `sqlx` connection URL (e.g. `sqlite:locations.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Shared secret authorizing seed and reset. Not a full auth system.
    pub seed_secret: String,
    /// Path of the JSON fixture document used by the seed operation.
    pub fixture_path: PathBuf,
    pub bind_addr: String,
}

impl Settings {
    /// Read settings from `DATABASE_URL`, `SEED_SECRET`, `FIXTURE_PATH`, and
    /// `BIND_ADDR`, falling back to insecure local defaults when unset.
    pub fn from_env() -> Self {
        let settings = Self {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            seed_secret: env_or("SEED_SECRET", DEFAULT_SEED_SECRET),
            fixture_path: PathBuf::from(env_or("FIXTURE_PATH", DEFAULT_FIXTURE_PATH)),
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
        };
        if settings.seed_secret == DEFAULT_SEED_SECRET {
            tracing::warn!("SEED_SECRET is unset; seed and reset accept the insecure default");
        }
        settings
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
