// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, one module per TOML table.

mod api;
mod database;
mod logging;
mod resilience;
mod search;

pub use api::{ApiConfig, ApiConfigLayer, DEFAULT_API_BASE_URL};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use resilience::{ResilienceConfig, ResilienceConfigLayer};
pub use search::{SearchConfig, SearchConfigLayer};

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Deserializes an optional string straight into a secret so plaintext never
/// sits in a layer.
pub(crate) fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
