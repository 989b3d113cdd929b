//! Derived size estimates. Recomputed wholesale whenever the instruction
//! sequence changes; never patched in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimated byte contribution of every layer plus the shipped total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEstimate {
    /// Starting bytes of the final stage's base.
    pub base_image_bytes: u64,

    /// Per-instruction delta, keyed by global instruction index. FROM lines
    /// carry their stage's starting bytes; RUN deltas may be negative
    /// (cleanup commands).
    pub per_layer_bytes: BTreeMap<usize, i64>,

    /// Cumulative size at the end of each stage, in stage order.
    pub per_stage_bytes: Vec<u64>,

    /// Cumulative size of the final stage only. Intermediate build stages
    /// are discarded at run time and never inflate this.
    pub total_bytes: u64,
}

impl SizeEstimate {
    pub fn layer_bytes(&self, index: usize) -> i64 {
        self.per_layer_bytes.get(&index).copied().unwrap_or(0)
    }
}
