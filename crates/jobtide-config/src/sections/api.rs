// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! USAJOBS API configuration section.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://data.usajobs.gov/api/search";
const DEFAULT_REQUEST_DELAY_MS: u64 = 1500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable named in the missing-key error.
pub(crate) const API_KEY_ENV: &str = "JOBTIDE_API_KEY";

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default, deserialize_with = "super::deserialize_secret")]
	pub api_key: Option<SecretString>,
	#[serde(default)]
	pub user_agent: Option<String>,
	#[serde(default)]
	pub request_delay_ms: Option<u64>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl ApiConfigLayer {
	pub fn merge(&mut self, other: ApiConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.api_key.is_some() {
			self.api_key = other.api_key;
		}
		if other.user_agent.is_some() {
			self.user_agent = other.user_agent;
		}
		if other.request_delay_ms.is_some() {
			self.request_delay_ms = other.request_delay_ms;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> ApiConfig {
		ApiConfig {
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
			api_key: self.api_key,
			user_agent: self
				.user_agent
				.unwrap_or_else(jobtide_common_http::user_agent),
			request_delay: Duration::from_millis(
				self.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS),
			),
			timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
		}
	}
}

/// USAJOBS API configuration (runtime, fully resolved).
///
/// The API key stays optional here so commands that never call the API
/// (`stats`) can run without it; [`ApiConfig::take_api_key`] enforces it.
#[derive(Debug)]
pub struct ApiConfig {
	pub base_url: String,
	pub api_key: Option<SecretString>,
	pub user_agent: String,
	pub request_delay: Duration,
	pub timeout: Duration,
}

impl Default for ApiConfig {
	fn default() -> Self {
		ApiConfigLayer::default().finalize()
	}
}

impl ApiConfig {
	/// Moves the API key out, failing if none was configured.
	pub fn take_api_key(&mut self) -> Result<SecretString, ConfigError> {
		self
			.api_key
			.take()
			.ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_ENV.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use secrecy::ExposeSecret;

	#[test]
	fn test_defaults() {
		let config = ApiConfigLayer::default().finalize();
		assert_eq!(config.base_url, DEFAULT_API_BASE_URL);
		assert_eq!(config.request_delay, Duration::from_millis(1500));
		assert_eq!(config.timeout, Duration::from_secs(30));
		assert!(config.user_agent.starts_with("jobtide/"));
		assert!(config.api_key.is_none());
	}

	#[test]
	fn test_missing_key_is_reported_by_env_name() {
		let mut config = ApiConfig::default();
		let err = config.take_api_key().unwrap_err();
		assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "JOBTIDE_API_KEY"));
	}

	#[test]
	fn test_merge_keeps_base_key_when_overlay_has_none() {
		let mut base = ApiConfigLayer {
			api_key: Some(SecretString::from("from-file".to_string())),
			request_delay_ms: Some(100),
			..Default::default()
		};
		base.merge(ApiConfigLayer {
			request_delay_ms: Some(0),
			..Default::default()
		});
		let mut config = base.finalize();
		assert_eq!(config.take_api_key().unwrap().expose_secret(), "from-file");
		assert_eq!(config.request_delay, Duration::ZERO);
	}

	#[test]
	fn test_deserialize_layer_with_secret() {
		let layer: ApiConfigLayer = toml::from_str(
			r#"
api_key = "abc123"
timeout_secs = 5
"#,
		)
		.unwrap();
		assert_eq!(layer.api_key.as_ref().unwrap().expose_secret(), "abc123");
		assert_eq!(layer.timeout_secs, Some(5));
		assert!(!format!("{layer:?}").contains("abc123"));
	}
}
