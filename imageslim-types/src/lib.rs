//! Shared DTOs (schemas-as-code) for the imageslim workspace.
//!
//! # Design constraints
//! - Report types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod estimate;
pub mod files;
pub mod report;
pub mod spec;
pub mod suggestion;

/// Schema identifiers.
pub mod schema {
    pub const IMAGESLIM_REPORT_V1: &str = "imageslim.report.v1";
}
