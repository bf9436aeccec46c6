// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core domain types for jobtide.

pub mod posting;

pub use posting::{JobPosting, PostingValidationError};
