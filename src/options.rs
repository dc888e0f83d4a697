// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::context::Culture;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// How composite binds are kept from recursing forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CycleGuard {
    /// A composite below the root binds only when the path equals the type's simple name.
    /// Anything else yields `Null`, which also rejects nested members named differently from
    /// their type.
    #[default]
    TypeName,

    /// A composite yields `Null` only when its type is already being bound further up the
    /// current path.
    VisitedTypes,
}

/// Binder configuration.
///
/// ```json
/// { "keyDelimiter": "$", "cycleGuard": "visitedTypes", "maxDepth": 16 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct BinderOptions {
    /// Separator of compound source keys; only the last segment is kept.
    pub key_delimiter: char,

    pub cycle_guard: CycleGuard,

    /// Ceiling on nested binds below the root.
    pub max_depth: usize,

    /// When a dotted path has no values, retry with its last segment.
    pub leaf_name_fallback: bool,

    pub culture: Culture,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            key_delimiter: '$',
            cycle_guard: CycleGuard::default(),
            max_depth: 32,
            leaf_name_fallback: true,
            culture: Culture::invariant(),
        }
    }
}

impl BinderOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow!("Failed to parse binder options: {e}"))
    }
}
