// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	ApiConfigLayer, DatabaseConfigLayer, LoggingConfigLayer, ResilienceConfigLayer,
	SearchConfigLayer,
};

/// Top-level configuration layer - all fields are Option for merging.
#[derive(Debug, Default, Deserialize)]
pub struct JobtideConfigLayer {
	#[serde(default)]
	pub api: Option<ApiConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub search: Option<SearchConfigLayer>,
	#[serde(default)]
	pub resilience: Option<ResilienceConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl JobtideConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: JobtideConfigLayer) {
		merge_option(&mut self.api, other.api, ApiConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
		merge_option(&mut self.search, other.search, SearchConfigLayer::merge);
		merge_option(
			&mut self.resilience,
			other.resilience,
			ResilienceConfigLayer::merge,
		);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T: Default>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	if let Some(other) = other {
		merge(base.get_or_insert_with(T::default), other);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_fills_missing_sections() {
		let mut base = JobtideConfigLayer::default();
		base.merge(JobtideConfigLayer {
			search: Some(SearchConfigLayer {
				max_pages: Some(3),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(base.search.unwrap().max_pages, Some(3));
		assert!(base.api.is_none());
	}

	#[test]
	fn test_deserialize_full_file() {
		let layer: JobtideConfigLayer = toml::from_str(
			r#"
[api]
request_delay_ms = 500

[database]
host = "db"

[search]
keyword = "data science"
max_pages = 4

[resilience]
max_attempts = 5

[logging]
level = "debug"
"#,
		)
		.unwrap();
		assert_eq!(layer.api.unwrap().request_delay_ms, Some(500));
		assert_eq!(layer.database.unwrap().host.as_deref(), Some("db"));
		assert_eq!(layer.search.unwrap().max_pages, Some(4));
		assert_eq!(layer.resilience.unwrap().max_attempts, Some(5));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
