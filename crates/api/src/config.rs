//! Application configuration loaded from environment variables.

use sale_commit::{Collections, CommitConfig};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `json` for JSON lines, anything else for human-readable output
/// - `DATABASE_URL` — PostgreSQL connection string; the in-memory store is used when unset
/// - `STORE_DATABASE_ID` — logical database the documents live in (default: `"pos"`)
/// - `STOCK_CONFLICT_RETRIES` — retries after a version conflict (default: `3`)
/// - `INVENTORY_ITEMS_COLLECTION_ID`, `STOCK_MUTATIONS_COLLECTION_ID`,
///   `CUSTOMERS_COLLECTION_ID`, `POS_SHIFTS_COLLECTION_ID`,
///   `POS_TRANSACTIONS_COLLECTION_ID` — collection identifiers
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub store_database_id: String,
    pub max_conflict_retries: u32,
    pub collections: Collections,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup. Unparsable numbers fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);
        let collections = defaults.collections.clone();

        Self {
            host: text("HOST", defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: text("RUST_LOG", defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            store_database_id: text("STORE_DATABASE_ID", defaults.store_database_id),
            max_conflict_retries: lookup("STOCK_CONFLICT_RETRIES")
                .and_then(|r| r.parse().ok())
                .unwrap_or(defaults.max_conflict_retries),
            collections: Collections {
                inventory_items: text(
                    "INVENTORY_ITEMS_COLLECTION_ID",
                    collections.inventory_items,
                ),
                stock_mutations: text(
                    "STOCK_MUTATIONS_COLLECTION_ID",
                    collections.stock_mutations,
                ),
                customers: text("CUSTOMERS_COLLECTION_ID", collections.customers),
                shifts: text("POS_SHIFTS_COLLECTION_ID", collections.shifts),
                transactions: text("POS_TRANSACTIONS_COLLECTION_ID", collections.transactions),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn commit_config(&self) -> CommitConfig {
        CommitConfig {
            max_conflict_retries: self.max_conflict_retries,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            store_database_id: "pos".to_string(),
            max_conflict_retries: CommitConfig::default().max_conflict_retries,
            collections: Collections::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_url.is_none());
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.collections, Collections::default());
    }

    #[test]
    fn test_empty_environment_matches_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.store_database_id, "pos");
        assert_eq!(config.collections.transactions, "posTransactions");
    }

    #[test]
    fn test_reads_every_variable() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/pos"),
            ("STORE_DATABASE_ID", "store-1"),
            ("STOCK_CONFLICT_RETRIES", "7"),
            ("INVENTORY_ITEMS_COLLECTION_ID", "inv"),
            ("STOCK_MUTATIONS_COLLECTION_ID", "mut"),
            ("CUSTOMERS_COLLECTION_ID", "cust"),
            ("POS_SHIFTS_COLLECTION_ID", "shifts"),
            ("POS_TRANSACTIONS_COLLECTION_ID", "txns"),
        ]);

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/pos")
        );
        assert_eq!(config.store_database_id, "store-1");
        assert_eq!(config.commit_config().max_conflict_retries, 7);
        assert_eq!(
            config.collections,
            Collections {
                inventory_items: "inv".to_string(),
                stock_mutations: "mut".to_string(),
                customers: "cust".to_string(),
                shifts: "shifts".to_string(),
                transactions: "txns".to_string(),
            }
        );
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = from_pairs(&[("PORT", "http"), ("STOCK_CONFLICT_RETRIES", "-1")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_conflict_retries, 3);
    }

    #[test]
    fn test_blank_database_url_means_memory_store() {
        let config = from_pairs(&[("DATABASE_URL", "  ")]);
        assert!(config.database_url.is_none());
    }
}
