// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};

/// Default User-Agent: `jobtide/{version}`.
///
/// USAJOBS asks callers to put a contact email in the User-Agent, so the
/// configured value normally replaces this.
pub fn user_agent() -> String {
	format!("jobtide/{}", env!("CARGO_PKG_VERSION"))
}

/// A reqwest builder preset with `user_agent`.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}
