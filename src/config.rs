// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for mask resolution.
//!
//! # Example
//!
//! ```
//! use numeric_field_mask::{FieldMaskConfig, FieldMaskResolver};
//!
//! // Minimal config (uses defaults)
//! let config = FieldMaskConfig::default();
//! assert_eq!(config.cache_max_entries, None); // unbounded
//!
//! // Bounded cache, append repeated fields when copying
//! let config: FieldMaskConfig = serde_json::from_str(
//!     r#"{"cache_max_entries": 10000, "cache_ttl_secs": 300, "replace_repeated_fields": false}"#,
//! ).unwrap();
//! let resolver = FieldMaskResolver::from_config(&config).unwrap();
//! assert!(!resolver.merge_options().replace_repeated_fields);
//! ```

use serde::Deserialize;
use std::time::Duration;

use crate::error::{FieldMaskError, Result};
use crate::field_mask::MergeOptions;
use crate::numeric::EvictionPolicy;

/// Configuration for a [`FieldMaskResolver`](crate::FieldMaskResolver).
///
/// All fields have defaults. The default cache never evicts; memory then
/// grows with the number of distinct (message type, mask) pairs seen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMaskConfig {
    /// Max cached resolutions before oldest-first eviction (None = unbounded)
    #[serde(default)]
    pub cache_max_entries: Option<usize>,

    /// Expire cached resolutions after this many seconds (None = never)
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Copier merge options
    #[serde(default = "default_replace")]
    pub replace_repeated_fields: bool,
    #[serde(default = "default_replace")]
    pub replace_primitive_fields: bool,
    #[serde(default = "default_replace")]
    pub replace_message_fields: bool,
}

fn default_replace() -> bool { true }

impl Default for FieldMaskConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: None,
            cache_ttl_secs: None,
            replace_repeated_fields: default_replace(),
            replace_primitive_fields: default_replace(),
            replace_message_fields: default_replace(),
        }
    }
}

impl FieldMaskConfig {
    /// Reject settings that would make the cache useless.
    pub fn validate(&self) -> Result<()> {
        if self.cache_max_entries == Some(0) {
            return Err(FieldMaskError::InvalidConfig(
                "cache_max_entries must be at least 1 (omit it for an unbounded cache)".into(),
            ));
        }
        if self.cache_ttl_secs == Some(0) {
            return Err(FieldMaskError::InvalidConfig(
                "cache_ttl_secs must be at least 1 (omit it to never expire)".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy {
            max_entries: self.cache_max_entries,
            ttl: self.cache_ttl_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            replace_message_fields: self.replace_message_fields,
            replace_repeated_fields: self.replace_repeated_fields,
            replace_primitive_fields: self.replace_primitive_fields,
        }
    }
}
