//! The analyze pipeline, extracted from the CLI.
//!
//! I/O-agnostic: the build context arrives through a `ProjectScanner` and
//! artifacts leave through a `WritePort`, so the whole pipeline runs against
//! in-memory doubles in tests.

use crate::ports::{ProjectScanner, WritePort};
use anyhow::Context;
use chrono::Utc;
use imageslim_estimate::{EstimateError, ImageSizeTable, RunCostModel, estimate};
use imageslim_ignore::{IgnoreWarning, parse_rules, resolve};
use imageslim_parse::{ParseError, parse, print, print_instruction};
use imageslim_render::render_report_md;
use imageslim_rules::{RuleContext, RuleInputs, evaluate_all};
use imageslim_types::estimate::SizeEstimate;
use imageslim_types::files::FileEntry;
use imageslim_types::report::{
    AnalyzeReport, EstimateSummary, LayerLine, ReportRunInfo, ReportToolInfo, ReportWarning,
    SpecSummary, SuggestionReport,
};
use imageslim_types::spec::BuildSpec;
use imageslim_types::suggestion::Suggestion;
use tracing::debug;

/// Error type for pipeline results. Parse and estimate failures carry their
/// own diagnostics; everything else is wrapped as internal.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Everything the pipeline needs besides the scanned context.
#[derive(Debug, Clone)]
pub struct AnalyzeInputs {
    pub spec_text: String,

    /// Path the spec text came from, for the report. `None` for inline text.
    pub spec_path: Option<String>,

    /// Ignore file contents; `None` when the context has no ignore file.
    pub ignore_text: Option<String>,

    pub size_table: ImageSizeTable,
    pub cost_model: RunCostModel,
    pub rule_inputs: RuleInputs,
}

/// Outcome of `run_analyze`.
#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub spec: BuildSpec,
    pub included: Vec<FileEntry>,
    pub warnings: Vec<IgnoreWarning>,
    pub estimate: SizeEstimate,
    pub suggestions: Vec<Suggestion>,
    pub report: AnalyzeReport,
}

/// Run the analyze pipeline: scan the context, resolve ignores, parse the
/// spec, estimate layer sizes, and evaluate every builtin rule.
///
/// The caller is responsible for writing artifacts to disk (via `WritePort`)
/// or the convenience `write_report_artifacts` helper.
pub fn run_analyze(
    inputs: &AnalyzeInputs,
    scanner: &dyn ProjectScanner,
    tool: ReportToolInfo,
) -> Result<AnalyzeOutcome, AnalyzeError> {
    let started = Utc::now();

    let files = scanner.scan().context("scan build context")?;

    let (rules, warnings) = match &inputs.ignore_text {
        Some(text) => parse_rules(text),
        None => (Vec::new(), Vec::new()),
    };
    let included = resolve(&files, &rules);

    let spec = parse(&inputs.spec_text)?;
    let size_estimate = estimate(&spec, &included, &inputs.size_table, &inputs.cost_model)?;

    let ctx = RuleContext {
        spec: &spec,
        estimate: &size_estimate,
        files: &included,
        inputs: &inputs.rule_inputs,
        size_table: &inputs.size_table,
        cost_model: &inputs.cost_model,
    };
    let suggestions = evaluate_all(&ctx)?;
    debug!(
        suggestions = suggestions.len(),
        total_bytes = size_estimate.total_bytes,
        "analyze pipeline finished"
    );

    let ended = Utc::now();
    let run = ReportRunInfo {
        started_at: started.to_rfc3339(),
        ended_at: Some(ended.to_rfc3339()),
        duration_ms: Some((ended - started).num_milliseconds().max(0) as u64),
    };
    let report = report_from_analysis(
        &spec,
        inputs.spec_path.clone(),
        &size_estimate,
        &suggestions,
        &warnings,
        tool,
        run,
    );

    Ok(AnalyzeOutcome {
        spec,
        included,
        warnings,
        estimate: size_estimate,
        suggestions,
        report,
    })
}

/// Write all analyze artifacts to the output directory: the JSON report, its
/// markdown rendering, and one rewritten spec + diff per suggestion.
pub fn write_report_artifacts(
    outcome: &AnalyzeOutcome,
    out_dir: &camino::Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    if !outcome.suggestions.is_empty() {
        let suggestions_dir = out_dir.join("suggestions");
        writer.create_dir_all(&suggestions_dir)?;
        for suggestion in &outcome.report.suggestions {
            writer.write_file(
                &suggestions_dir.join(format!("{}.Dockerfile", suggestion.rule_id)),
                suggestion.rewritten_spec.as_bytes(),
            )?;
            writer.write_file(
                &suggestions_dir.join(format!("{}.diff", suggestion.rule_id)),
                suggestion.diff.as_bytes(),
            )?;
        }
    }

    Ok(())
}

fn report_from_analysis(
    spec: &BuildSpec,
    spec_path: Option<String>,
    size_estimate: &SizeEstimate,
    suggestions: &[Suggestion],
    warnings: &[IgnoreWarning],
    tool: ReportToolInfo,
    run: ReportRunInfo,
) -> AnalyzeReport {
    let original_text = print(spec);

    let layers = spec
        .instructions()
        .map(|instruction| LayerLine {
            index: instruction.index as u64,
            kind: instruction.kind,
            instruction: print_instruction(instruction),
            bytes: size_estimate.layer_bytes(instruction.index),
        })
        .collect();

    let suggestion_reports = suggestions
        .iter()
        .map(|s| {
            let rewritten_text = print(&s.rewritten);
            let diff = diffy::create_patch(&original_text, &rewritten_text).to_string();
            SuggestionReport {
                id: s.id,
                rule_id: s.rule_id.clone(),
                description: s.description.clone(),
                estimated_total_bytes: s.estimated_total_bytes,
                savings_bytes: s.savings_bytes,
                notes: s.notes.clone(),
                added_ignore_rules: s.added_ignore_rules.clone(),
                rewritten_spec: rewritten_text,
                diff,
            }
        })
        .collect();

    let report_warnings = warnings
        .iter()
        .map(|w| ReportWarning {
            code: "invalid_ignore_pattern".to_string(),
            message: format!("line {}: `{}` ({})", w.line, w.pattern, w.reason),
        })
        .collect();

    AnalyzeReport {
        schema: imageslim_types::schema::IMAGESLIM_REPORT_V1.to_string(),
        tool,
        run,
        spec: SpecSummary {
            path: spec_path,
            stages: spec.stages.len() as u64,
            instructions: spec.instruction_count() as u64,
            final_base: spec
                .final_stage()
                .map(|s| s.base_ref().to_string())
                .unwrap_or_default(),
        },
        estimate: EstimateSummary {
            base_image_bytes: size_estimate.base_image_bytes,
            total_bytes: size_estimate.total_bytes,
            layers,
        },
        suggestions: suggestion_reports,
        warnings: report_warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryProjectScanner;
    use camino::{Utf8Path, Utf8PathBuf};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemWritePort {
        files: Mutex<HashMap<String, Vec<u8>>>,
        dirs: Mutex<Vec<String>>,
    }

    impl WritePort for MemWritePort {
        fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
            self.files
                .lock()
                .expect("lock files")
                .insert(path.as_str().to_string(), contents.to_vec());
            Ok(())
        }

        fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
            self.dirs
                .lock()
                .expect("lock dirs")
                .push(path.as_str().to_string());
            Ok(())
        }
    }

    fn tool() -> ReportToolInfo {
        ReportToolInfo {
            name: "imageslim".to_string(),
            version: "0.0.0-test".to_string(),
        }
    }

    fn node_inputs(spec_text: &str, ignore_text: Option<&str>) -> AnalyzeInputs {
        let mut size_table = ImageSizeTable::default();
        size_table.insert("node:18", 1_000_000_000);
        size_table.insert("node:18-alpine", 50_000_000);
        AnalyzeInputs {
            spec_text: spec_text.to_string(),
            spec_path: Some("Dockerfile".to_string()),
            ignore_text: ignore_text.map(str::to_string),
            size_table,
            cost_model: RunCostModel::default(),
            rule_inputs: RuleInputs::default(),
        }
    }

    #[test]
    fn analyze_estimates_and_suggests_for_a_fat_single_stage() {
        let inputs = node_inputs("FROM node:18\nCOPY . .\nCMD [\"node\", \"server.js\"]\n", None);
        let scanner = InMemoryProjectScanner::new(vec![FileEntry::new("server.js", 5_000_000)]);

        let outcome = run_analyze(&inputs, &scanner, tool()).expect("analyze");
        assert_eq!(outcome.estimate.total_bytes, 1_005_000_000);
        assert_eq!(outcome.report.estimate.layers.len(), 3);
        assert_eq!(outcome.report.estimate.layers[1].bytes, 5_000_000);

        // slim-base fires against the priced node:18 base.
        let slim = outcome
            .suggestions
            .iter()
            .find(|s| s.rule_id == "slim-base")
            .expect("slim-base fires");
        assert_eq!(slim.estimated_total_bytes, 55_000_000);
        assert_eq!(slim.savings_bytes, 950_000_000);

        // Report suggestions mirror the engine output, sorted by rule id.
        let ids: Vec<&str> = outcome
            .report
            .suggestions
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn ignore_rules_shrink_the_copied_bytes_and_warn_on_bad_globs() {
        let inputs = node_inputs(
            "FROM node:18\nCOPY . .\nCMD [\"node\"]\n",
            Some("[bad\nnode_modules\n"),
        );
        let scanner = InMemoryProjectScanner::new(vec![
            FileEntry::new("server.js", 1_000_000),
            FileEntry::new("node_modules/left-pad/index.js", 200_000_000),
        ]);

        let outcome = run_analyze(&inputs, &scanner, tool()).expect("analyze");
        assert_eq!(outcome.included.len(), 1);
        assert_eq!(outcome.estimate.total_bytes, 1_001_000_000);

        assert_eq!(outcome.report.warnings.len(), 1);
        assert_eq!(outcome.report.warnings[0].code, "invalid_ignore_pattern");
        assert!(outcome.report.warnings[0].message.contains("[bad"));
    }

    #[test]
    fn unknown_base_image_is_a_fatal_estimate_error() {
        let inputs = node_inputs("FROM imaginary:latest\nCMD [\"x\"]\n", None);
        let scanner = InMemoryProjectScanner::new(vec![]);

        let err = run_analyze(&inputs, &scanner, tool()).expect_err("unknown base");
        assert!(matches!(err, AnalyzeError::Estimate(_)));
    }

    #[test]
    fn malformed_spec_is_a_parse_error() {
        let inputs = node_inputs("FROM node:18\nMAINTAINER nobody\n", None);
        let scanner = InMemoryProjectScanner::new(vec![]);

        let err = run_analyze(&inputs, &scanner, tool()).expect_err("unknown keyword");
        assert!(matches!(err, AnalyzeError::Parse(_)));
    }

    #[test]
    fn write_report_artifacts_writes_expected_files() {
        let inputs = node_inputs("FROM node:18\nCOPY . .\nCMD [\"node\"]\n", None);
        let scanner = InMemoryProjectScanner::new(vec![FileEntry::new("server.js", 1_000)]);
        let outcome = run_analyze(&inputs, &scanner, tool()).expect("analyze");
        assert!(!outcome.suggestions.is_empty());

        let writer = MemWritePort::default();
        let out_dir = Utf8PathBuf::from("out");
        write_report_artifacts(&outcome, &out_dir, &writer).expect("write artifacts");

        let files = writer.files.lock().expect("files");
        assert!(files.contains_key("out/report.json"));
        assert!(files.contains_key("out/report.md"));
        assert!(files.contains_key("out/suggestions/slim-base.Dockerfile"));
        assert!(files.contains_key("out/suggestions/slim-base.diff"));

        let report_json = files.get("out/report.json").expect("report json");
        let json: serde_json::Value = serde_json::from_slice(report_json).expect("parse report");
        assert_eq!(json["schema"], imageslim_types::schema::IMAGESLIM_REPORT_V1);
        assert_eq!(json["estimate"]["total_bytes"], 1_000_001_000u64);

        let diff = files.get("out/suggestions/slim-base.diff").expect("diff");
        let diff = std::str::from_utf8(diff).expect("utf8");
        assert!(diff.contains("-FROM node:18"));
        assert!(diff.contains("+FROM node:18-alpine"));
    }

    #[test]
    fn two_stage_totals_exclude_the_build_stage() {
        let inputs = node_inputs(
            "FROM node:18 AS build\nCOPY . .\nRUN npm ci\nFROM node:18-alpine\nCOPY --from=build /app/.output /app/.output\nCMD [\"node\"]\n",
            None,
        );
        let scanner = InMemoryProjectScanner::new(vec![FileEntry::new("package.json", 2_000)]);

        let outcome = run_analyze(&inputs, &scanner, tool()).expect("analyze");
        // Final stage: alpine base plus a container-path COPY that matches
        // nothing in the context.
        assert_eq!(outcome.estimate.total_bytes, 50_000_000);
        assert_eq!(outcome.report.spec.final_base, "node:18-alpine");
        assert_eq!(outcome.report.spec.stages, 2);
    }
}
