// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Extraction and load pipeline for USAJOBS postings.
//!
//! A run fetches search pages through a [`PageSource`], normalizes each page
//! into postings, deduplicates them by `position_uri` and upserts the batch
//! into a [`jobtide_db::PostingStore`] in one transaction.

pub mod error;
pub mod load;
pub mod paginate;
pub mod pipeline;
pub mod source;

pub use error::{EtlError, Result};
pub use load::{dedup_postings, load_postings};
pub use paginate::{paginate, Extraction, SearchPlan};
pub use pipeline::{Pipeline, RunRequest, RunSummary};
pub use source::PageSource;
