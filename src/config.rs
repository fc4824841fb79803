//! Application configuration loaded from environment variables.

use std::{net::IpAddr, str::FromStr};

use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{key} has an invalid value {value:?}")]
	Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
	pub host: IpAddr,
	pub port: u16,
	/// When unset, the in-memory store is used.
	pub database_url: Option<String>,
	pub database_max_connections: u32,
	pub log_level: Level,
	/// When set, spans are exported to this OTLP (gRPC) collector.
	pub otlp_endpoint: Option<String>,
}

impl Config {
	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		Ok(Self {
			host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse(&lookup, "PORT", 3000)?,
			database_url: non_empty("DATABASE_URL"),
			database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
			log_level: parse(&lookup, "LOG_LEVEL", Level::INFO)?,
			otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}

fn parse<T: FromStr>(
	lookup: impl Fn(&str) -> Option<String>,
	key: &'static str,
	default: T,
) -> Result<T, ConfigError> {
	match lookup(key) {
		None => Ok(default),
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| ConfigError::Invalid { key, value }),
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
		let vars = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn test_defaults() {
		let config = config(&[]).unwrap();

		assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
		assert_eq!(config.port, 3000);
		assert!(config.database_url.is_none());
		assert_eq!(config.database_max_connections, 10);
		assert_eq!(config.log_level, Level::INFO);
		assert!(config.otlp_endpoint.is_none());
	}

	#[test]
	fn test_overrides() {
		let config = config(&[
			("HOST", "0.0.0.0"),
			("PORT", "8080"),
			("DATABASE_URL", "postgres://localhost/posts"),
			("LOG_LEVEL", "debug"),
			("OTEL_EXPORTER_OTLP_ENDPOINT", ""),
		])
		.unwrap();

		assert_eq!(config.host, IpAddr::from([0, 0, 0, 0]));
		assert_eq!(config.port, 8080);
		assert_eq!(
			config.database_url.as_deref(),
			Some("postgres://localhost/posts")
		);
		assert_eq!(config.log_level, Level::DEBUG);
		assert!(config.otlp_endpoint.is_none());
	}

	#[test]
	fn test_invalid_port() {
		let error = config(&[("PORT", "eighty")]).unwrap_err();

		assert!(matches!(error, ConfigError::Invalid { key: "PORT", .. }));
	}
}
