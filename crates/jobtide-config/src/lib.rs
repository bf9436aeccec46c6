// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for jobtide.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Type-safe configuration with validation
//! - Secrets (API key, database credentials) held as `SecretString`
//!
//! # Usage
//!
//! ```ignore
//! use jobtide_config::load_config;
//!
//! let config = load_config()?;
//! println!("searching for {}", config.search.keyword);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::JobtideConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, CONFIG_PATH_ENV};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug)]
pub struct JobtideConfig {
	pub api: ApiConfig,
	pub database: DatabaseConfig,
	pub search: SearchConfig,
	pub resilience: ResilienceConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables
/// 2. Config file (`$JOBTIDE_CONFIG`, or `./jobtide.toml` when present)
/// 3. Built-in defaults
pub fn load_config() -> Result<JobtideConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::default_location()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration with an explicit config file, which must exist.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<JobtideConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::required(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<JobtideConfig, ConfigError> {
	load_from_sources(vec![Box::new(EnvSource::new())])
}

/// Merge sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<JobtideConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = JobtideConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: JobtideConfigLayer) -> Result<JobtideConfig, ConfigError> {
	let api = layer.api.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize()?;
	let search = layer.search.unwrap_or_default().finalize();
	let resilience = layer.resilience.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	let config = JobtideConfig {
		api,
		database,
		search,
		resilience,
		logging,
	};
	validate_config(&config)?;

	info!(
		base_url = %config.api.base_url,
		api_key_configured = config.api.api_key.is_some(),
		keyword = %config.search.keyword,
		location = config.search.location.as_deref().unwrap_or("-"),
		max_pages = config.search.max_pages,
		max_attempts = config.resilience.retry.max_attempts,
		failure_threshold = config.resilience.breaker.failure_threshold,
		log_format = %config.logging.format,
		"Configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &JobtideConfig) -> Result<(), ConfigError> {
	let retry = &config.resilience.retry;
	if retry.max_attempts < 1 {
		return Err(ConfigError::Validation(
			"resilience.max_attempts must be at least 1".to_string(),
		));
	}
	if retry.backoff_factor.is_nan() || retry.backoff_factor <= 1.0 {
		return Err(ConfigError::Validation(format!(
			"resilience.backoff_factor must be greater than 1.0, got {}",
			retry.backoff_factor
		)));
	}
	if config.resilience.breaker.failure_threshold < 1 {
		return Err(ConfigError::Validation(
			"resilience.failure_threshold must be at least 1".to_string(),
		));
	}
	if config.search.max_pages < 1 {
		return Err(ConfigError::Validation(
			"search.max_pages must be at least 1".to_string(),
		));
	}
	if config.search.results_per_page < 1 {
		return Err(ConfigError::Validation(
			"search.results_per_page must be at least 1".to_string(),
		));
	}
	if config.database.max_connections < 1 {
		return Err(ConfigError::Validation(
			"database.max_connections must be at least 1".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use secrecy::ExposeSecret;
	use std::io::Write;
	use std::time::Duration;

	fn load(sources: Vec<Box<dyn ConfigSource>>) -> Result<JobtideConfig, ConfigError> {
		load_from_sources(sources)
	}

	#[test]
	fn test_defaults_only() {
		let mut config = load(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
		assert_eq!(config.search.keyword, "data engineering");
		assert_eq!(config.search.max_pages, 20);
		assert!(config.api.take_api_key().is_err());
	}

	#[test]
	fn test_env_overrides_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[api]
request_delay_ms = 250

[search]
keyword = "from file"
max_pages = 3
"#
		)
		.unwrap();

		// Deliberately out of order; precedence decides.
		let mut config = load(vec![
			Box::new(EnvSource::from_map([
				("SEARCH_KEYWORD", "from env"),
				("JOBTIDE_API_KEY", "k"),
			])),
			Box::new(TomlSource::required(file.path())),
			Box::new(DefaultsSource),
		])
		.unwrap();

		assert_eq!(config.search.keyword, "from env");
		assert_eq!(config.search.max_pages, 3);
		assert_eq!(config.api.request_delay, Duration::from_millis(250));
		assert_eq!(config.api.take_api_key().unwrap().expose_secret(), "k");
	}

	#[test]
	fn test_validation_rejects_zero_pages() {
		let err = load(vec![Box::new(EnvSource::from_map([("MAX_PAGES", "0")]))]).unwrap_err();
		assert!(err.to_string().contains("max_pages"));
	}

	#[test]
	fn test_validation_rejects_non_growing_backoff() {
		let err = load(vec![Box::new(EnvSource::from_map([(
			"JOBTIDE_RETRY_BACKOFF_FACTOR",
			"1.0",
		)]))])
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_validation_rejects_zero_attempts_and_threshold() {
		let err = load(vec![Box::new(EnvSource::from_map([(
			"JOBTIDE_RETRY_MAX_ATTEMPTS",
			"0",
		)]))])
		.unwrap_err();
		assert!(err.to_string().contains("max_attempts"));

		let err = load(vec![Box::new(EnvSource::from_map([(
			"JOBTIDE_BREAKER_FAILURE_THRESHOLD",
			"0",
		)]))])
		.unwrap_err();
		assert!(err.to_string().contains("failure_threshold"));
	}

	#[test]
	fn test_debug_output_redacts_secrets() {
		let config = load(vec![Box::new(EnvSource::from_map([
			("JOBTIDE_API_KEY", "super-secret-key"),
			("POSTGRES_PASSWORD", "hunter2"),
		]))])
		.unwrap();
		let debug = format!("{config:?}");
		assert!(!debug.contains("super-secret-key"));
		assert!(!debug.contains("hunter2"));
	}
}
