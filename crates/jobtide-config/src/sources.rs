// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::JobtideConfigLayer;
use crate::sections::{
	ApiConfigLayer, DatabaseConfigLayer, LogFormat, LoggingConfigLayer, ResilienceConfigLayer,
	SearchConfigLayer,
};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "JOBTIDE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "jobtide.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<JobtideConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<JobtideConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(JobtideConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that is skipped when absent.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file that must exist, e.g. one named on the command line.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// `$JOBTIDE_CONFIG` if set, else `./jobtide.toml`.
	pub fn default_location() -> Self {
		match std::env::var(CONFIG_PATH_ENV) {
			Ok(path) if !path.is_empty() => Self::required(path),
			_ => Self::new(DEFAULT_CONFIG_FILE),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<JobtideConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(JobtideConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: JobtideConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Jobtide-specific settings use `JOBTIDE_<SECTION>_<FIELD>`; the
/// conventional names (`DATABASE_URL`, `POSTGRES_*`, `SEARCH_KEYWORD`,
/// `MAX_PAGES`, `LOG_LEVEL`, `LOG_DIR`, `USAJOBS_API_KEY`) are honoured as
/// fallbacks. Secrets also accept a `<VAR>_FILE` path.
#[derive(Default)]
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads from a fixed map instead of the process environment.
	pub fn from_map<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn first_var(&self, names: &[&str]) -> Option<String> {
		names.iter().find_map(|name| self.var(name))
	}

	fn parse<T: FromStr>(&self, names: &[&str], type_name: &str) -> Result<Option<T>, ConfigError> {
		for name in names {
			if let Some(v) = self.var(name) {
				return v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid {type_name} value '{v}'"),
				});
			}
		}
		Ok(None)
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	/// Loads a secret using the `VAR` / `VAR_FILE` convention, trying each
	/// name in order. A single trailing newline is stripped from files.
	fn secret(&self, names: &[&str]) -> Result<Option<SecretString>, ConfigError> {
		for name in names {
			let file_var = format!("{name}_FILE");
			if let Some(path) = self.var(&file_var) {
				let content =
					std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
						var: file_var.clone(),
						path: PathBuf::from(&path),
						source,
					})?;
				let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
				return Ok(Some(SecretString::from(secret)));
			}
			if let Some(value) = self.var(name) {
				return Ok(Some(SecretString::from(value)));
			}
		}
		Ok(None)
	}

	fn load_api(&self) -> Result<ApiConfigLayer, ConfigError> {
		Ok(ApiConfigLayer {
			base_url: self.var("JOBTIDE_API_BASE_URL"),
			api_key: self.secret(&["JOBTIDE_API_KEY", "USAJOBS_API_KEY"])?,
			user_agent: self.var("JOBTIDE_API_USER_AGENT"),
			request_delay_ms: self.parse(&["JOBTIDE_API_DELAY_MS"], "u64")?,
			timeout_secs: self.parse(&["JOBTIDE_API_TIMEOUT_SECS"], "u64")?,
		})
	}

	fn load_database(&self) -> Result<DatabaseConfigLayer, ConfigError> {
		Ok(DatabaseConfigLayer {
			url: self.secret(&["JOBTIDE_DATABASE_URL", "DATABASE_URL"])?,
			host: self.var("POSTGRES_HOST"),
			port: self.parse(&["POSTGRES_PORT"], "u16")?,
			name: self.var("POSTGRES_DB"),
			user: self.var("POSTGRES_USER"),
			password: self.secret(&["POSTGRES_PASSWORD"])?,
			max_connections: self.parse(&["JOBTIDE_DATABASE_MAX_CONNECTIONS"], "u32")?,
			connect_timeout_secs: self.parse(&["JOBTIDE_DATABASE_CONNECT_TIMEOUT_SECS"], "u64")?,
		})
	}

	fn load_search(&self) -> Result<SearchConfigLayer, ConfigError> {
		Ok(SearchConfigLayer {
			keyword: self.first_var(&["JOBTIDE_SEARCH_KEYWORD", "SEARCH_KEYWORD"]),
			location: self.first_var(&["JOBTIDE_SEARCH_LOCATION", "SEARCH_LOCATION"]),
			max_pages: self.parse(&["JOBTIDE_MAX_PAGES", "MAX_PAGES"], "u32")?,
			results_per_page: self.parse(&["JOBTIDE_RESULTS_PER_PAGE"], "u32")?,
		})
	}

	fn load_resilience(&self) -> Result<ResilienceConfigLayer, ConfigError> {
		Ok(ResilienceConfigLayer {
			max_attempts: self.parse(&["JOBTIDE_RETRY_MAX_ATTEMPTS"], "u32")?,
			base_delay_ms: self.parse(&["JOBTIDE_RETRY_BASE_DELAY_MS"], "u64")?,
			max_delay_ms: self.parse(&["JOBTIDE_RETRY_MAX_DELAY_MS"], "u64")?,
			backoff_factor: self.parse(&["JOBTIDE_RETRY_BACKOFF_FACTOR"], "f64")?,
			jitter: self.bool("JOBTIDE_RETRY_JITTER"),
			failure_threshold: self.parse(&["JOBTIDE_BREAKER_FAILURE_THRESHOLD"], "u32")?,
			recovery_timeout_secs: self.parse(&["JOBTIDE_BREAKER_RECOVERY_TIMEOUT_SECS"], "u64")?,
		})
	}

	fn load_logging(&self) -> Result<LoggingConfigLayer, ConfigError> {
		let format = match self.var("JOBTIDE_LOG_FORMAT") {
			Some(v) => Some(v.parse::<LogFormat>()?),
			None => None,
		};
		Ok(LoggingConfigLayer {
			level: self.first_var(&["JOBTIDE_LOG_LEVEL", "LOG_LEVEL"]),
			format,
			dir: self
				.first_var(&["JOBTIDE_LOG_DIR", "LOG_DIR"])
				.map(PathBuf::from),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<JobtideConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(JobtideConfigLayer {
			api: Some(self.load_api()?),
			database: Some(self.load_database()?),
			search: Some(self.load_search()?),
			resilience: Some(self.load_resilience()?),
			logging: Some(self.load_logging()?),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use secrecy::ExposeSecret;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.api.is_none());
		assert!(layer.database.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/jobtide.toml").load().unwrap();
		assert!(layer.search.is_none());
	}

	#[test]
	fn test_required_toml_source_missing_file_errors() {
		let err = TomlSource::required("/nonexistent/jobtide.toml")
			.load()
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileRead { .. }));
	}

	#[test]
	fn test_toml_source_parse_error_names_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[search\nkeyword = 1").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_fallback_names() {
		let layer = EnvSource::from_map([
			("USAJOBS_API_KEY", "legacy-key"),
			("SEARCH_KEYWORD", "data science"),
			("MAX_PAGES", "7"),
			("POSTGRES_HOST", "db"),
			("LOG_LEVEL", "DEBUG"),
		])
		.load()
		.unwrap();

		let api = layer.api.unwrap();
		assert_eq!(api.api_key.unwrap().expose_secret(), "legacy-key");
		let search = layer.search.unwrap();
		assert_eq!(search.keyword.as_deref(), Some("data science"));
		assert_eq!(search.max_pages, Some(7));
		assert_eq!(layer.database.unwrap().host.as_deref(), Some("db"));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("DEBUG"));
	}

	#[test]
	fn test_jobtide_names_win_over_fallbacks() {
		let layer = EnvSource::from_map([
			("JOBTIDE_API_KEY", "primary"),
			("USAJOBS_API_KEY", "legacy"),
			("JOBTIDE_MAX_PAGES", "2"),
			("MAX_PAGES", "9"),
		])
		.load()
		.unwrap();
		assert_eq!(
			layer.api.unwrap().api_key.unwrap().expose_secret(),
			"primary"
		);
		assert_eq!(layer.search.unwrap().max_pages, Some(2));
	}

	#[test]
	fn test_secret_file_convention() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		let path = file.path().to_string_lossy().to_string();

		let layer = EnvSource::from_map([
			("JOBTIDE_API_KEY_FILE", path.as_str()),
			("JOBTIDE_API_KEY", "from-env"),
		])
		.load()
		.unwrap();
		assert_eq!(
			layer.api.unwrap().api_key.unwrap().expose_secret(),
			"from-file"
		);
	}

	#[test]
	fn test_missing_secret_file_errors() {
		let result = EnvSource::from_map([("JOBTIDE_API_KEY_FILE", "/nonexistent/key")]).load();
		let err = result.unwrap_err();
		assert!(matches!(err, ConfigError::SecretFile { .. }));
		assert!(err.to_string().contains("JOBTIDE_API_KEY_FILE"));
	}

	#[test]
	fn test_invalid_number_names_variable() {
		let result = EnvSource::from_map([("MAX_PAGES", "lots")]).load();
		match result {
			Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "MAX_PAGES"),
			other => panic!("expected InvalidValue, got {other:?}"),
		}
	}

	#[test]
	fn test_invalid_log_format() {
		let result = EnvSource::from_map([("JOBTIDE_LOG_FORMAT", "xml")]).load();
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn test_empty_values_are_ignored() {
		let layer = EnvSource::from_map([("SEARCH_KEYWORD", "")]).load().unwrap();
		assert!(layer.search.unwrap().keyword.is_none());
	}
}
