//! Application configuration management.

use chrono_tz::Tz;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Analytics engine configuration.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// B2B billing configuration.
    #[serde(default)]
    pub billing: BillingConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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

/// Analytics engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// IANA timezone the business operates in. Day, hour and weekday buckets
    /// and calendar-period boundaries are computed in this zone.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Deadline for a single order fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Interval of the background refresh tasks.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Time-to-live of cached analytics reports.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum number of cached analytics reports.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Default length of top-N rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            fetch_timeout_secs: default_fetch_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            top_n: default_top_n(),
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::America::Sao_Paulo
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_cache_capacity() -> u64 {
    500
}

fn default_top_n() -> usize {
    10
}

/// B2B billing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Days between the end of a billing period and the invoice due date.
    #[serde(default = "default_payment_terms")]
    pub payment_terms_days: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            payment_terms_days: default_payment_terms(),
        }
    }
}

fn default_payment_terms() -> u32 {
    30
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
            .add_source(
                config::Environment::with_prefix("PDJ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("PDJ__DATABASE__URL", Some("postgres://localhost/pdj_test")),
                ("RUN_MODE", Some("test-defaults")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/pdj_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.analytics.top_n, 10);
                assert_eq!(config.billing.payment_terms_days, 30);
            },
        );
    }

    #[test]
    fn test_load_reads_timezone_override() {
        temp_env::with_vars(
            [
                ("PDJ__DATABASE__URL", Some("postgres://localhost/pdj_test")),
                ("PDJ__ANALYTICS__TIMEZONE", Some("Europe/Lisbon")),
                ("RUN_MODE", Some("test-timezone")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.analytics.timezone, chrono_tz::Europe::Lisbon);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("PDJ__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-missing")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
