// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request and response types for the USAJOBS search API.

use serde::{Deserialize, Serialize};

/// Upstream cap on `ResultsPerPage`.
pub const MAX_RESULTS_PER_PAGE: u32 = 500;

/// Parameters for fetching one page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
	pub keyword: String,
	pub location: Option<String>,
	pub results_per_page: u32,
	/// 1-based page number.
	pub page: u32,
}

impl SearchQuery {
	pub fn new(keyword: impl Into<String>) -> Self {
		Self {
			keyword: keyword.into(),
			location: None,
			results_per_page: MAX_RESULTS_PER_PAGE,
			page: 1,
		}
	}

	pub fn with_location(mut self, location: Option<String>) -> Self {
		self.location = location.filter(|l| !l.trim().is_empty());
		self
	}

	pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
		self.results_per_page = results_per_page;
		self
	}

	pub fn with_page(mut self, page: u32) -> Self {
		self.page = page;
		self
	}

	/// Page size actually sent upstream: clamped to `1..=MAX_RESULTS_PER_PAGE`.
	pub fn effective_page_size(&self) -> u32 {
		self.results_per_page.clamp(1, MAX_RESULTS_PER_PAGE)
	}

	/// Query-string pairs in the order the API documents them.
	pub fn to_params(&self) -> Vec<(&'static str, String)> {
		let mut params = vec![
			("Keyword", self.keyword.clone()),
			("ResultsPerPage", self.effective_page_size().to_string()),
			("Page", self.page.max(1).to_string()),
			("WhoMayApply", "All".to_string()),
		];
		if let Some(location) = &self.location {
			params.push(("LocationName", location.clone()));
		}
		params
	}
}

/// One decoded page of search results.
///
/// Items are kept as raw JSON so a single malformed listing cannot fail the
/// whole page; [`crate::extract_postings`] decodes them one at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
	#[serde(rename = "SearchResult", default)]
	pub search_result: SearchResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
	#[serde(rename = "SearchResultCount", default)]
	pub count_on_page: u64,
	#[serde(rename = "SearchResultCountAll", default)]
	pub count_all: u64,
	#[serde(rename = "SearchResultItems", default)]
	pub items: Vec<serde_json::Value>,
}

impl SearchPage {
	pub fn items(&self) -> &[serde_json::Value] {
		&self.search_result.items
	}

	pub fn items_on_page(&self) -> usize {
		self.search_result.items.len()
	}

	pub fn count_on_page(&self) -> u64 {
		self.search_result.count_on_page
	}

	pub fn count_all(&self) -> u64 {
		self.search_result.count_all
	}

	pub fn is_empty(&self) -> bool {
		self.search_result.items.is_empty()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResultItem {
	#[serde(rename = "MatchedObjectDescriptor", default)]
	pub descriptor: PositionDescriptor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PositionDescriptor {
	#[serde(rename = "PositionTitle", default)]
	pub position_title: Option<String>,
	#[serde(rename = "PositionURI", default)]
	pub position_uri: Option<String>,
	#[serde(rename = "PositionLocation", default)]
	pub position_location: Vec<PositionLocation>,
	#[serde(rename = "PositionRemuneration", default)]
	pub position_remuneration: Vec<Remuneration>,
	#[serde(rename = "OrganizationName", default)]
	pub organization_name: Option<String>,
	#[serde(rename = "DepartmentName", default)]
	pub department_name: Option<String>,
	#[serde(rename = "PositionStartDate", default)]
	pub position_start_date: Option<String>,
	#[serde(rename = "PositionEndDate", default)]
	pub position_end_date: Option<String>,
	#[serde(rename = "JobCategory", default)]
	pub job_category: Vec<CodeName>,
	#[serde(rename = "JobGrade", default)]
	pub job_grade: Vec<CodeName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PositionLocation {
	#[serde(rename = "CityName", default)]
	pub city_name: Option<String>,
	#[serde(rename = "StateCode", alias = "CountrySubDivisionCode", default)]
	pub state_code: Option<String>,
	#[serde(rename = "CountryCode", default)]
	pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Remuneration {
	#[serde(rename = "MinimumRange", default)]
	pub minimum_range: Option<Amount>,
	#[serde(rename = "MaximumRange", default)]
	pub maximum_range: Option<Amount>,
	#[serde(rename = "RateIntervalCode", default)]
	pub rate_interval_code: Option<String>,
}

/// Salary bounds arrive as `"80000.0"` but occasionally as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Amount {
	Number(f64),
	Text(String),
}

impl Amount {
	pub fn value(&self) -> Option<f64> {
		let value = match self {
			Amount::Number(n) => Some(*n),
			Amount::Text(s) => s.trim().parse::<f64>().ok(),
		};
		value.filter(|v| v.is_finite())
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CodeName {
	#[serde(rename = "Name", default)]
	pub name: Option<String>,
	#[serde(rename = "Code", default)]
	pub code: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_query_caps_page_size() {
		let query = SearchQuery::new("data engineering").with_results_per_page(1000);
		assert_eq!(query.effective_page_size(), MAX_RESULTS_PER_PAGE);

		let query = SearchQuery::new("data engineering").with_results_per_page(25);
		assert_eq!(query.effective_page_size(), 25);
	}

	#[test]
	fn test_params_include_who_may_apply_and_optional_location() {
		let query = SearchQuery::new("data engineering").with_page(3);
		let params = query.to_params();
		assert!(params.contains(&("Keyword", "data engineering".to_string())));
		assert!(params.contains(&("ResultsPerPage", "500".to_string())));
		assert!(params.contains(&("Page", "3".to_string())));
		assert!(params.contains(&("WhoMayApply", "All".to_string())));
		assert!(!params.iter().any(|(k, _)| *k == "LocationName"));

		let params = query.with_location(Some("Chicago".to_string())).to_params();
		assert!(params.contains(&("LocationName", "Chicago".to_string())));
	}

	#[test]
	fn test_blank_location_is_dropped() {
		let query = SearchQuery::new("x").with_location(Some("  ".to_string()));
		assert!(query.location.is_none());
	}

	#[test]
	fn test_page_decodes_counts_and_items() {
		let body = serde_json::json!({
			"LanguageCode": "EN",
			"SearchResult": {
				"SearchResultCount": 2,
				"SearchResultCountAll": 10,
				"SearchResultItems": [{"MatchedObjectId": "1"}, {"MatchedObjectId": "2"}]
			}
		});
		let page: SearchPage = serde_json::from_value(body).unwrap();
		assert_eq!(page.count_on_page(), 2);
		assert_eq!(page.count_all(), 10);
		assert_eq!(page.items_on_page(), 2);
	}

	#[test]
	fn test_unrecognized_body_decodes_to_empty_page() {
		let page: SearchPage =
			serde_json::from_value(serde_json::json!({"InvalidKey": "InvalidValue"})).unwrap();
		assert!(page.is_empty());
		assert_eq!(page.count_all(), 0);
	}

	#[test]
	fn test_amount_accepts_text_and_numbers() {
		let text: Amount = serde_json::from_value(serde_json::json!("80000.0")).unwrap();
		let number: Amount = serde_json::from_value(serde_json::json!(80000)).unwrap();
		let junk: Amount = serde_json::from_value(serde_json::json!("n/a")).unwrap();
		assert_eq!(text.value(), Some(80000.0));
		assert_eq!(number.value(), Some(80000.0));
		assert_eq!(junk.value(), None);
	}
}
