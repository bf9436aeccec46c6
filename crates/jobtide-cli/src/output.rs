// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt::Write as _;

use jobtide_db::PostingStatistics;
use jobtide_etl::RunSummary;

pub fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(summary)?);
	} else {
		print!("{}", render_summary(summary));
	}
	Ok(())
}

pub fn print_statistics(stats: &PostingStatistics, json: bool) -> anyhow::Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(stats)?);
	} else {
		print!("{}", render_statistics(stats));
	}
	Ok(())
}

fn render_summary(summary: &RunSummary) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "ETL run completed in {:.2}s", summary.duration.as_secs_f64());
	let _ = writeln!(out, "  pages fetched:     {}", summary.pages_fetched);
	let _ = writeln!(out, "  api requests:      {}", summary.api_requests);
	let _ = writeln!(out, "  records extracted: {}", summary.records_extracted);
	let _ = writeln!(out, "  inserted:          {}", summary.inserted);
	let _ = writeln!(out, "  updated:           {}", summary.updated);
	match summary.total_in_store {
		Some(total) => {
			let _ = writeln!(out, "  total in store:    {total}");
		}
		None => {
			let _ = writeln!(out, "  total in store:    unavailable");
		}
	}
	if !summary.errors.is_empty() {
		let _ = writeln!(out, "  errors ({}):", summary.errors.len());
		for error in &summary.errors {
			let _ = writeln!(out, "    - {error}");
		}
	}
	out
}

fn render_statistics(stats: &PostingStatistics) -> String {
	let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
		t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
	};
	let mut out = String::new();
	let _ = writeln!(out, "total postings:       {}", stats.total_postings);
	let _ = writeln!(out, "unique organizations: {}", stats.unique_organizations);
	let _ = writeln!(out, "added today:          {}", stats.postings_today);
	let _ = writeln!(out, "added this week:      {}", stats.postings_this_week);
	let _ = writeln!(out, "first added:          {}", fmt_time(stats.first_created_at));
	let _ = writeln!(out, "last added:           {}", fmt_time(stats.last_created_at));
	out
}
