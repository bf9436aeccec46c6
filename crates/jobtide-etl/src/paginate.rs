// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Multi-page extraction for a single search.

use chrono::Utc;
use jobtide_common_core::JobPosting;
use jobtide_common_http::{ClassifiedError, FailureKind};
use jobtide_usajobs::{extract_postings, SearchPage, SearchQuery, MAX_RESULTS_PER_PAGE};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::source::PageSource;

/// What to search for and how far to page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPlan {
	pub keyword: String,
	pub location: Option<String>,
	pub max_pages: u32,
	pub results_per_page: u32,
}

impl SearchPlan {
	pub fn new(keyword: impl Into<String>) -> Self {
		Self {
			keyword: keyword.into(),
			location: None,
			max_pages: 20,
			results_per_page: MAX_RESULTS_PER_PAGE,
		}
	}

	fn query(&self, page: u32) -> SearchQuery {
		SearchQuery::new(self.keyword.clone())
			.with_location(self.location.clone())
			.with_results_per_page(self.results_per_page)
			.with_page(page)
	}
}

/// Postings gathered across pages, plus the non-fatal errors hit on the way.
#[derive(Debug, Default)]
pub struct Extraction {
	pub postings: Vec<JobPosting>,
	pub pages_fetched: u32,
	pub errors: Vec<String>,
}

/// Whether `page` is the last one worth requesting.
///
/// A short page ends the search, as does the API reporting that this page's
/// count already covers the total.
pub(crate) fn is_last_page(page: &SearchPage, page_size: u32) -> bool {
	page.items_on_page() < page_size as usize || page.count_on_page() >= page.count_all()
}

/// Fetches pages `1..=max_pages` in order until the results run out.
///
/// A failed page is recorded and skipped, except a rate-limit failure, which
/// ends pagination since further requests would only dig deeper.
#[instrument(skip(source, plan), fields(keyword = %plan.keyword, max_pages = plan.max_pages))]
pub async fn paginate(source: &dyn PageSource, plan: &SearchPlan) -> Extraction {
	let mut extraction = Extraction::default();

	for page_no in 1..=plan.max_pages {
		let query = plan.query(page_no);
		let page = match source.fetch_page(&query).await {
			Ok(page) => page,
			Err(err) => {
				let message = format!("Error processing page {page_no}: {err}");
				error!(page = page_no, kind = %err.kind(), "{message}");
				extraction.errors.push(message);

				if err.kind() == FailureKind::RateLimited {
					warn!(page = page_no, "Rate limited, stopping pagination");
					break;
				}
				continue;
			}
		};
		extraction.pages_fetched += 1;

		if page.is_empty() {
			info!(page = page_no, "No more results found");
			break;
		}

		let postings = extract_postings(&page, Utc::now());
		let extracted = postings.len();
		extraction.postings.extend(postings);
		info!(
			page = page_no,
			items = page.items_on_page(),
			extracted,
			total = extraction.postings.len(),
			"Page extracted"
		);

		if is_last_page(&page, query.effective_page_size()) {
			break;
		}
	}

	extraction
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use jobtide_usajobs::UsaJobsError;
	use serde_json::json;
	use std::collections::VecDeque;
	use std::sync::Mutex;

	/// Serves scripted responses and records the pages requested.
	pub(crate) struct ScriptedSource {
		responses: Mutex<VecDeque<Result<SearchPage, UsaJobsError>>>,
		requested: Mutex<Vec<SearchQuery>>,
	}

	impl ScriptedSource {
		fn new(responses: Vec<Result<SearchPage, UsaJobsError>>) -> Self {
			Self {
				responses: Mutex::new(responses.into()),
				requested: Mutex::new(Vec::new()),
			}
		}

		fn pages_requested(&self) -> Vec<u32> {
			self.requested.lock().unwrap().iter().map(|q| q.page).collect()
		}
	}

	#[async_trait]
	impl PageSource for ScriptedSource {
		async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, UsaJobsError> {
			self.requested.lock().unwrap().push(query.clone());
			self
				.responses
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or_else(|| Ok(SearchPage::default()))
		}

		fn request_count(&self) -> u64 {
			self.requested.lock().unwrap().len() as u64
		}
	}

	fn page(prefix: &str, items: usize, count_on_page: u64, count_all: u64) -> SearchPage {
		let items: Vec<_> = (0..items)
			.map(|i| {
				json!({"MatchedObjectDescriptor": {
					"PositionTitle": "Data Engineer",
					"PositionURI": format!("https://www.usajobs.gov/job/{prefix}-{i}")
				}})
			})
			.collect();
		serde_json::from_value(json!({
			"SearchResult": {
				"SearchResultCount": count_on_page,
				"SearchResultCountAll": count_all,
				"SearchResultItems": items
			}
		}))
		.unwrap()
	}

	fn plan(max_pages: u32) -> SearchPlan {
		SearchPlan {
			max_pages,
			..SearchPlan::new("data engineering")
		}
	}

	#[tokio::test]
	async fn test_full_page_continues_short_page_stops() {
		let source = ScriptedSource::new(vec![
			Ok(page("a", 500, 500, 1000)),
			Ok(page("b", 100, 100, 1000)),
			Ok(page("c", 500, 500, 1000)),
		]);
		let extraction = paginate(&source, &plan(10)).await;

		assert_eq!(source.pages_requested(), vec![1, 2]);
		assert_eq!(extraction.pages_fetched, 2);
		assert_eq!(extraction.postings.len(), 600);
		assert!(extraction.errors.is_empty());
	}

	#[tokio::test]
	async fn test_count_covering_total_stops_even_on_full_page() {
		let source = ScriptedSource::new(vec![Ok(page("a", 500, 500, 500))]);
		let extraction = paginate(&source, &plan(10)).await;
		assert_eq!(source.pages_requested(), vec![1]);
		assert_eq!(extraction.postings.len(), 500);
	}

	#[tokio::test]
	async fn test_empty_page_stops() {
		let source = ScriptedSource::new(vec![Ok(SearchPage::default())]);
		let extraction = paginate(&source, &plan(10)).await;
		assert_eq!(source.pages_requested(), vec![1]);
		assert!(extraction.postings.is_empty());
		assert_eq!(extraction.pages_fetched, 1);
	}

	#[tokio::test]
	async fn test_max_pages_bounds_the_loop() {
		let responses = (0..5)
			.map(|i| Ok(page(&i.to_string(), 500, 500, 100_000)))
			.collect();
		let source = ScriptedSource::new(responses);
		let extraction = paginate(&source, &plan(3)).await;
		assert_eq!(source.pages_requested(), vec![1, 2, 3]);
		assert_eq!(extraction.postings.len(), 1500);
	}

	#[tokio::test]
	async fn test_transient_failure_is_recorded_and_skipped() {
		let source = ScriptedSource::new(vec![
			Ok(page("a", 500, 500, 1200)),
			Err(UsaJobsError::Timeout),
			Ok(page("c", 200, 200, 1200)),
		]);
		let extraction = paginate(&source, &plan(10)).await;

		assert_eq!(source.pages_requested(), vec![1, 2, 3]);
		assert_eq!(extraction.pages_fetched, 2);
		assert_eq!(extraction.postings.len(), 700);
		assert_eq!(
			extraction.errors,
			vec!["Error processing page 2: Request timed out".to_string()]
		);
	}

	#[tokio::test]
	async fn test_circuit_open_is_skipped_like_transient() {
		let source = ScriptedSource::new(vec![
			Err(UsaJobsError::CircuitOpen),
			Ok(page("b", 10, 10, 10)),
		]);
		let extraction = paginate(&source, &plan(5)).await;
		assert_eq!(source.pages_requested(), vec![1, 2]);
		assert_eq!(extraction.errors.len(), 1);
		assert_eq!(extraction.postings.len(), 10);
	}

	#[tokio::test]
	async fn test_rate_limit_stops_pagination() {
		let source = ScriptedSource::new(vec![
			Ok(page("a", 500, 500, 5000)),
			Err(UsaJobsError::RateLimited),
			Ok(page("c", 500, 500, 5000)),
		]);
		let extraction = paginate(&source, &plan(10)).await;

		assert_eq!(source.pages_requested(), vec![1, 2]);
		assert_eq!(extraction.postings.len(), 500);
		assert_eq!(
			extraction.errors,
			vec!["Error processing page 2: Rate limit exceeded".to_string()]
		);
	}

	#[tokio::test]
	async fn test_smaller_page_size_drives_termination() {
		let source = ScriptedSource::new(vec![
			Ok(page("a", 50, 50, 120)),
			Ok(page("b", 50, 50, 120)),
			Ok(page("c", 20, 20, 120)),
		]);
		let plan = SearchPlan {
			results_per_page: 50,
			..plan(10)
		};
		let extraction = paginate(&source, &plan).await;
		assert_eq!(source.pages_requested(), vec![1, 2, 3]);
		assert_eq!(extraction.postings.len(), 120);
	}

	#[tokio::test]
	async fn test_invalid_items_are_dropped_not_fatal() {
		let mut bad = page("a", 3, 3, 3);
		bad.search_result.items.push(json!({"MatchedObjectDescriptor": {
			"PositionTitle": "Data Engineer",
			"PositionURI": "not-a-url"
		}}));
		let source = ScriptedSource::new(vec![Ok(bad)]);
		let extraction = paginate(&source, &plan(1)).await;
		assert_eq!(extraction.postings.len(), 3);
		assert!(extraction.errors.is_empty());
	}

	#[tokio::test]
	async fn test_unbounded_page_limit_ends_on_last_page() {
		let source = ScriptedSource::new(vec![
			Ok(page("a", 500, 500, 100_000)),
			Err(UsaJobsError::Timeout),
			Ok(page("c", 10, 10, 100_000)),
		]);
		let extraction = paginate(&source, &plan(u32::MAX)).await;
		assert_eq!(source.pages_requested(), vec![1, 2, 3]);
		assert_eq!(extraction.postings.len(), 510);
	}

	#[tokio::test]
	async fn test_failure_on_final_allowed_page_ends_loop() {
		let responses = vec![Err(UsaJobsError::Timeout), Err(UsaJobsError::Timeout)];
		let source = ScriptedSource::new(responses);
		let extraction = paginate(&source, &plan(2)).await;
		assert_eq!(source.pages_requested(), vec![1, 2]);
		assert_eq!(extraction.errors.len(), 2);
		assert_eq!(extraction.pages_fetched, 0);
	}

	#[test]
	fn test_is_last_page() {
		assert!(!is_last_page(&page("a", 500, 500, 1000), 500));
		assert!(is_last_page(&page("a", 100, 100, 1000), 500));
		assert!(is_last_page(&page("a", 500, 500, 500), 500));
	}
}
