// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Search defaults for a run.

use serde::{Deserialize, Serialize};

const DEFAULT_KEYWORD: &str = "data engineering";
const DEFAULT_MAX_PAGES: u32 = 20;
const DEFAULT_RESULTS_PER_PAGE: u32 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchConfigLayer {
	pub keyword: Option<String>,
	pub location: Option<String>,
	pub max_pages: Option<u32>,
	pub results_per_page: Option<u32>,
}

impl SearchConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.keyword.is_some() {
			self.keyword = other.keyword;
		}
		if other.location.is_some() {
			self.location = other.location;
		}
		if other.max_pages.is_some() {
			self.max_pages = other.max_pages;
		}
		if other.results_per_page.is_some() {
			self.results_per_page = other.results_per_page;
		}
	}

	pub fn finalize(self) -> SearchConfig {
		SearchConfig {
			keyword: self
				.keyword
				.unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
			location: self.location.filter(|l| !l.trim().is_empty()),
			max_pages: self.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
			results_per_page: self.results_per_page.unwrap_or(DEFAULT_RESULTS_PER_PAGE),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
	pub keyword: String,
	pub location: Option<String>,
	pub max_pages: u32,
	pub results_per_page: u32,
}

impl Default for SearchConfig {
	fn default() -> Self {
		SearchConfigLayer::default().finalize()
	}
}
