// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Postgres persistence for job postings.

pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod pool;
pub mod posting;
pub mod schema;

pub use error::{DbError, Result};
#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryPostingStore;
pub use pool::create_pool;
pub use posting::{PostingRepository, PostingStatistics, PostingStore, UpsertCounts};
pub use schema::ensure_schema;
pub use sqlx::PgPool;
