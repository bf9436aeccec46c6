// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Normalization of raw USAJOBS listings into [`JobPosting`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use jobtide_common_core::JobPosting;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{CodeName, PositionLocation, Remuneration, SearchPage, SearchResultItem};

pub const LOCATION_NOT_SPECIFIED: &str = "Location not specified";
pub const REMUNERATION_NOT_SPECIFIED: &str = "Not specified";

/// Extracts valid postings from a page, stamping each with `extracted_at`.
///
/// Items that fail to decode or fail validation are skipped with a warning.
/// Output order follows the page's item order.
pub fn extract_postings(page: &SearchPage, extracted_at: DateTime<Utc>) -> Vec<JobPosting> {
	let mut postings = Vec::with_capacity(page.items_on_page());

	for (index, raw) in page.items().iter().enumerate() {
		let item = match SearchResultItem::deserialize(raw) {
			Ok(item) => item,
			Err(e) => {
				warn!(index, error = %e, "Skipping undecodable job item");
				continue;
			}
		};

		let posting = to_posting(item, extracted_at);
		if let Err(e) = posting.validate() {
			warn!(index, title = %posting.position_title, error = %e, "Invalid job data");
			continue;
		}
		postings.push(posting);
	}

	debug!(
		items = page.items_on_page(),
		valid = postings.len(),
		"Extracted job postings"
	);
	postings
}

fn to_posting(item: SearchResultItem, extracted_at: DateTime<Utc>) -> JobPosting {
	let d = item.descriptor;

	let mut posting = JobPosting::new(
		trimmed(d.position_title).unwrap_or_default(),
		trimmed(d.position_uri).unwrap_or_default(),
		extracted_at,
	);
	posting.position_location = Some(format_location(&d.position_location));
	posting.position_remuneration = Some(format_remuneration(&d.position_remuneration));
	posting.position_start_date = d.position_start_date.as_deref().and_then(parse_date);
	posting.position_end_date = d.position_end_date.as_deref().and_then(parse_date);
	posting.organization_name = trimmed(d.organization_name);
	posting.department_name = trimmed(d.department_name);
	posting.job_category = first_of(&d.job_category, |c| c.name.clone());
	posting.job_grade = first_of(&d.job_grade, |c| c.code.clone());
	posting
}

fn trimmed(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

fn first_of(entries: &[CodeName], pick: impl Fn(&CodeName) -> Option<String>) -> Option<String> {
	entries.first().and_then(|e| trimmed(pick(e)))
}

/// `"City, ST, CC"` from the first location; the country defaults to `US`.
pub(crate) fn format_location(locations: &[PositionLocation]) -> String {
	let Some(location) = locations.first() else {
		return LOCATION_NOT_SPECIFIED.to_string();
	};

	let country = location
		.country_code
		.clone()
		.or_else(|| Some("US".to_string()));
	let parts: Vec<String> = [location.city_name.clone(), location.state_code.clone(), country]
		.into_iter()
		.filter_map(trimmed)
		.collect();

	if parts.is_empty() {
		LOCATION_NOT_SPECIFIED.to_string()
	} else {
		parts.join(", ")
	}
}

/// `"$80,000 - $120,000 Per Year"` from the first remuneration entry.
pub(crate) fn format_remuneration(entries: &[Remuneration]) -> String {
	let Some(entry) = entries.first() else {
		return REMUNERATION_NOT_SPECIFIED.to_string();
	};

	let min = entry.minimum_range.as_ref().and_then(|a| a.value());
	let max = entry.maximum_range.as_ref().and_then(|a| a.value());
	let interval = entry
		.rate_interval_code
		.as_deref()
		.map(str::trim)
		.unwrap_or_default();

	let amount = match (min, max) {
		(Some(min), Some(max)) => format!("{} - {}", dollars(min), dollars(max)),
		(Some(min), None) => format!("{}+", dollars(min)),
		_ => return REMUNERATION_NOT_SPECIFIED.to_string(),
	};

	if interval.is_empty() {
		amount
	} else {
		format!("{amount} {interval}")
	}
}

/// Whole dollars with thousands separators, fractions truncated.
fn dollars(value: f64) -> String {
	let whole = value.trunc() as i64;
	let digits = whole.unsigned_abs().to_string();

	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(ch);
	}

	if whole < 0 {
		format!("-${grouped}")
	} else {
		format!("${grouped}")
	}
}

/// ISO-8601 date-time (offset, `Z`, or none) or bare date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
	let raw = raw.trim();
	if raw.is_empty() {
		return None;
	}

	if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
		return Some(dt.date_naive());
	}
	if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
		return Some(dt.date());
	}
	if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
		return Some(dt.date());
	}
	NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
