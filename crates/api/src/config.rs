//! Application configuration loaded from environment variables.

use std::str::FromStr;

use common::Money;
use domain::CheckoutPolicy;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: Postgres connection string; unset runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `MIN_ORDER_CENTS`: minimum pre-VAT subtotal (default: `20000`)
/// - `VAT_RATE_BPS`: VAT rate in basis points (default: `1800`)
/// - `DELIVERY_WINDOW_HOURS`: how far ahead a slot may be booked (default: `48`)
///
/// Unparsable values fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub policy: CheckoutPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let policy = CheckoutPolicy {
            min_order: parse(lookup("MIN_ORDER_CENTS"))
                .map(Money::from_cents)
                .unwrap_or(defaults.policy.min_order),
            vat_bps: parse(lookup("VAT_RATE_BPS")).unwrap_or(defaults.policy.vat_bps),
            delivery_window_hours: parse(lookup("DELIVERY_WINDOW_HOURS"))
                .unwrap_or(defaults.policy.delivery_window_hours),
            ..defaults.policy
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(lookup("PORT")).unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse(lookup("DATABASE_MAX_CONNECTIONS"))
                .unwrap_or(defaults.database_max_connections),
            policy,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            database_max_connections: 5,
            policy: CheckoutPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.policy, CheckoutPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("LOG_FORMAT", "json"),
            ("DATABASE_URL", "postgres://localhost/grocery"),
            ("MIN_ORDER_CENTS", "15000"),
            ("VAT_RATE_BPS", "800"),
            ("DELIVERY_WINDOW_HOURS", "24"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/grocery")
        );
        assert_eq!(config.policy.min_order, Money::from_units(150));
        assert_eq!(config.policy.vat_bps, 800);
        assert_eq!(config.policy.delivery_window_hours, 24);
        assert_eq!(config.policy.loyalty_bps, 500);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("VAT_RATE_BPS", "-1"), ("DATABASE_URL", "")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.policy.vat_bps, 1_800);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
