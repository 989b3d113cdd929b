//! Optimization suggestions: pure functions of (spec, estimate) producing a
//! whole replacement spec.

use crate::spec::BuildSpec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One fired optimization rule and its proposed rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Deterministic id (uuid v5 over rule id + spec fingerprint).
    pub id: Uuid,

    /// Kebab-case rule identifier, e.g. `slim-base`.
    pub rule_id: String,

    pub description: String,

    /// Full replacement stage list. The input spec is never mutated.
    pub rewritten: BuildSpec,

    /// Estimated shipped total after applying this suggestion alone.
    pub estimated_total_bytes: u64,

    /// Savings against the original estimate (floored at zero).
    pub savings_bytes: u64,

    /// Free-form caveats, e.g. "serve these assets from a CDN".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Ignore rules the caller should add for the estimate to hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_ignore_rules: Vec<String>,
}
