//! The structured analyze report written to disk as `report.json`.

use crate::spec::InstructionKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeReport {
    pub schema: String,
    pub tool: ReportToolInfo,
    pub run: ReportRunInfo,
    pub spec: SpecSummary,
    pub estimate: EstimateSummary,

    #[serde(default)]
    pub suggestions: Vec<SuggestionReport>,

    /// Non-fatal problems, e.g. skipped ignore patterns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecSummary {
    /// Path the spec was loaded from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub stages: u64,
    pub instructions: u64,

    /// Base ref of the shipped (final) stage, as written.
    pub final_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateSummary {
    pub base_image_bytes: u64,
    pub total_bytes: u64,

    #[serde(default)]
    pub layers: Vec<LayerLine>,
}

/// One line of the per-layer breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerLine {
    pub index: u64,
    pub kind: InstructionKind,

    /// The instruction as re-serialized text.
    pub instruction: String,

    pub bytes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub id: Uuid,
    pub rule_id: String,
    pub description: String,
    pub estimated_total_bytes: u64,
    pub savings_bytes: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_ignore_rules: Vec<String>,

    /// Re-serialized rewritten build spec.
    pub rewritten_spec: String,

    /// Unified diff original → rewritten.
    pub diff: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWarning {
    /// Stable machine token, e.g. `invalid_ignore_pattern`.
    pub code: String,
    pub message: String,
}
