//! Embeddable core library for imageslim.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a larger host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ProjectScanner`](ports::ProjectScanner) — enumerate the build context
//! - [`WritePort`](ports::WritePort) — write files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_analyze`](pipeline::run_analyze) — parse, estimate, and evaluate
//!   rules, producing an [`AnalyzeOutcome`](pipeline::AnalyzeOutcome)
//! - [`write_report_artifacts`](pipeline::write_report_artifacts) — persist
//!   the outcome via a [`WritePort`](ports::WritePort)

pub mod adapters;
pub mod pipeline;
pub mod ports;

// Re-export the table types so embedders don't need imageslim-estimate
// directly.
pub use imageslim_estimate::{ImageSizeTable, RunCostModel};
pub use imageslim_rules::RuleInputs;
