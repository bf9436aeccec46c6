// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.
//!
//! Console output always goes to stderr so `--json` summaries on stdout stay
//! machine-readable. When a log directory is configured, the same events are
//! appended to `<dir>/jobtide.log` without ANSI colouring.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use jobtide_config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

pub const LOG_FILE_NAME: &str = "jobtide.log";

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
	let layers = build_layers(config)?;

	tracing_subscriber::registry()
		.with(filter)
		.with(layers)
		.try_init()
		.context("failed to install tracing subscriber")?;
	Ok(())
}

fn build_layers(config: &LoggingConfig) -> anyhow::Result<Vec<BoxedLayer>> {
	let mut layers = vec![console_layer(config.format)];
	if let Some(dir) = &config.dir {
		let file = open_log_file(dir)?;
		layers.push(file_layer(config.format, file));
	}
	Ok(layers)
}

fn console_layer(format: LogFormat) -> BoxedLayer {
	match format {
		LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
		LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
	}
}

fn file_layer(format: LogFormat, file: File) -> BoxedLayer {
	let writer = Mutex::new(file);
	match format {
		LogFormat::Json => fmt::layer()
			.json()
			.with_ansi(false)
			.with_writer(writer)
			.boxed(),
		LogFormat::Pretty => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
	}
}

/// Opens `<dir>/jobtide.log` for appending, creating the directory if needed.
pub fn open_log_file(dir: &Path) -> anyhow::Result<File> {
	fs::create_dir_all(dir)
		.with_context(|| format!("failed to create log directory {}", dir.display()))?;
	let path = dir.join(LOG_FILE_NAME);
	OpenOptions::new()
		.create(true)
		.append(true)
		.open(&path)
		.with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn logging(format: LogFormat, dir: Option<&Path>) -> LoggingConfig {
		LoggingConfig {
			level: "info".to_string(),
			format,
			dir: dir.map(Path::to_path_buf),
		}
	}

	#[test]
	fn test_open_log_file_creates_directory_and_appends() {
		let tmp = tempfile::tempdir().unwrap();
		let dir = tmp.path().join("nested").join("logs");

		writeln!(open_log_file(&dir).unwrap(), "first").unwrap();
		writeln!(open_log_file(&dir).unwrap(), "second").unwrap();

		let contents = fs::read_to_string(dir.join(LOG_FILE_NAME)).unwrap();
		assert_eq!(contents, "first\nsecond\n");
	}

	#[test]
	fn test_without_dir_only_console_layer() {
		let layers = build_layers(&logging(LogFormat::Pretty, None)).unwrap();
		assert_eq!(layers.len(), 1);
	}

	#[test]
	fn test_file_layer_receives_events() {
		let tmp = tempfile::tempdir().unwrap();
		let layers = build_layers(&logging(LogFormat::Json, Some(tmp.path()))).unwrap();
		assert_eq!(layers.len(), 2);

		let subscriber = tracing_subscriber::registry()
			.with(EnvFilter::new("info"))
			.with(layers);
		tracing::subscriber::with_default(subscriber, || {
			tracing::info!(pages = 2, "ETL run completed");
			tracing::debug!("filtered out");
		});

		let contents = fs::read_to_string(tmp.path().join(LOG_FILE_NAME)).unwrap();
		assert!(contents.contains("ETL run completed"));
		assert!(contents.contains("\"pages\":2"));
		assert!(!contents.contains("filtered out"));
	}

	#[test]
	fn test_unwritable_dir_is_an_error() {
		let tmp = tempfile::NamedTempFile::new().unwrap();
		let err = open_log_file(&tmp.path().join("logs")).unwrap_err();
		assert!(err.to_string().contains("failed to create log directory"));
	}
}
