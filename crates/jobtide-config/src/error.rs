// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

/// Anything that stops configuration from resolving. All variants are fatal
/// at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} is not set (environment, .env or config file)")]
	MissingEnvVar(String),

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("config file {path} is not valid TOML: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("cannot read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid configuration: {0}")]
	Validation(String),

	#[error("cannot read secret {var} from {path}: {source}")]
	SecretFile {
		var: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
