use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Which [`Storage`](crate::storage::Storage) backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Rest,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: Backend,
    pub rest: RestConfig,
    pub sqlite: SqliteConfig,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    /// Re-list the table every N seconds so crawler updates show up; 0 disables.
    pub auto_refresh_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    pub path: String,
    /// JSON export of the hosted table to load on startup.
    pub import_path: Option<String>,
}

impl Config {
    /// Load configuration: defaults, then `{file_stem}.toml` (or any other
    /// extension the `config` crate reads), then `TRACKER__*` environment
    /// variables, then the legacy `DB_URL` / `DB_KEY` pair.
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let config: Config = config::Config::builder()
            .set_default("backend", "rest")?
            .set_default("rest.table", "tracker")?
            .set_default("sqlite.path", "stock_tracker.db")?
            .set_default("request_timeout_seconds", 25)?
            .set_default(
                "user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
            )?
            .set_default("auto_refresh_seconds", 0)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("TRACKER").separator("__"))
            .set_override_option("rest.url", std::env::var("DB_URL").ok())?
            .set_override_option("rest.key", std::env::var("DB_KEY").ok())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == Backend::Rest {
            if self.rest.url.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::Message(
                    "rest.url (or DB_URL) is required for the rest backend".to_string(),
                ));
            }
            if self.rest.key.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::Message(
                    "rest.key (or DB_KEY) is required for the rest backend".to_string(),
                ));
            }
        }
        if self.rest.table.trim().is_empty() {
            return Err(ConfigError::Message("rest.table must not be empty".to_string()));
        }
        Ok(())
    }
}
