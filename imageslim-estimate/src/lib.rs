//! Layer size estimation.
//!
//! Walks the spec stage by stage: each stage starts from its base's bytes
//! (an image table entry, or an earlier stage's cumulative size), COPY adds
//! the summed size of matched context files, RUN adds a pluggable cost-model
//! delta. Only the final stage counts toward the shipped total; earlier
//! stages are build-only and invisible in the artifact.

mod tables;

pub use tables::{ImageSizeTable, RunCostModel};

use camino::Utf8Path;
use glob::Pattern;
use imageslim_types::estimate::SizeEstimate;
use imageslim_types::files::FileEntry;
use imageslim_types::spec::{BuildSpec, InstructionKind, StageBase};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// The size table has no entry for a stage's base image. Fatal for this
    /// spec's estimate; other specs in a batch run are unaffected.
    #[error("stage {stage}: unknown base image `{image}`")]
    UnknownBaseImage { stage: usize, image: String },
}

/// Estimate per-layer and total bytes for a spec against an included file
/// set. Always builds a fresh `SizeEstimate`; nothing is mutated in place.
pub fn estimate(
    spec: &BuildSpec,
    included_files: &[FileEntry],
    size_table: &ImageSizeTable,
    cost_model: &RunCostModel,
) -> Result<SizeEstimate, EstimateError> {
    let mut per_layer_bytes: BTreeMap<usize, i64> = BTreeMap::new();
    let mut per_stage_bytes: Vec<u64> = Vec::new();
    let mut base_image_bytes = 0u64;

    for stage in &spec.stages {
        let start = match &stage.base {
            StageBase::Image { reference } => {
                size_table
                    .lookup(reference)
                    .ok_or_else(|| EstimateError::UnknownBaseImage {
                        stage: stage.index,
                        image: reference.clone(),
                    })?
            }
            StageBase::Stage { index } => per_stage_bytes.get(*index).copied().unwrap_or(0),
        };

        let mut cumulative = start;
        for instruction in &stage.instructions {
            let delta: i64 = match instruction.kind {
                InstructionKind::From => start as i64,
                InstructionKind::Copy => copied_bytes(instruction, included_files) as i64,
                InstructionKind::Run => cost_model.delta_for(&instruction.args.join(" ")),
                _ => 0,
            };
            if instruction.kind != InstructionKind::From {
                cumulative = cumulative.saturating_add_signed(delta);
            }
            per_layer_bytes.insert(instruction.index, delta);
        }

        per_stage_bytes.push(cumulative);
        base_image_bytes = start;
    }

    let total_bytes = per_stage_bytes.last().copied().unwrap_or(0);
    debug!(total_bytes, stages = spec.stages.len(), "estimated spec");

    Ok(SizeEstimate {
        base_image_bytes,
        per_layer_bytes,
        per_stage_bytes,
        total_bytes,
    })
}

/// Summed size of the included files matched by a COPY's source patterns.
/// A file counts once per COPY even when several sources match it. Zero
/// matches is legal (conditional copies, `--from=` container paths).
fn copied_bytes(
    instruction: &imageslim_types::spec::BuildInstruction,
    included_files: &[FileEntry],
) -> u64 {
    let mut matched: BTreeSet<usize> = BTreeSet::new();
    for source in instruction.copy_sources() {
        for (idx, file) in included_files.iter().enumerate() {
            if source_matches(source, &file.path) {
                matched.insert(idx);
            }
        }
    }
    matched.iter().map(|&idx| included_files[idx].size_bytes).sum()
}

/// `.` matches everything; otherwise glob match or directory-prefix match
/// against the context-relative path.
fn source_matches(source: &str, path: &Utf8Path) -> bool {
    let normalized = source
        .trim_start_matches("./")
        .trim_start_matches('/')
        .trim_end_matches('/');
    if normalized.is_empty() || normalized == "." {
        return true;
    }

    if let Ok(pattern) = Pattern::new(normalized)
        && pattern.matches(path.as_str())
    {
        return true;
    }

    path.as_str() == normalized || path.starts_with(normalized)
}
