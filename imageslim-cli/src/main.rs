mod config;
mod explain;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use fs_err as fs;
use imageslim_core::adapters::{FsProjectScanner, FsWritePort};
use imageslim_core::pipeline::{AnalyzeInputs, run_analyze, write_report_artifacts};
use imageslim_core::{ImageSizeTable, RuleInputs, RunCostModel};
use imageslim_render::format_bytes;
use imageslim_types::report::ReportToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "imageslim",
    version,
    about = "Estimates container image size from a build spec and suggests optimizations."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a build context: estimate layer sizes and evaluate rules.
    Analyze(AnalyzeArgs),
    /// Explain what an optimization rule does and when it fires.
    Explain(ExplainArgs),
    /// List all optimization rules.
    ListRules(ListRulesArgs),
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    /// Build context root (default: current directory).
    #[arg(long, default_value = ".")]
    context: Utf8PathBuf,

    /// Build spec path, relative to the context (default: Dockerfile).
    #[arg(long)]
    spec: Option<Utf8PathBuf>,

    /// Ignore file path, relative to the context (default: .dockerignore).
    #[arg(long)]
    ignore_file: Option<Utf8PathBuf>,

    /// Output directory for artifacts (default: <context>/imageslim-out).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// JSON file with image-size entries overlaid on the builtin table.
    #[arg(long)]
    image_sizes: Option<Utf8PathBuf>,

    /// JSON file with run-cost entries overlaid on the builtin model.
    #[arg(long)]
    run_costs: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule id to explain (e.g., "slim-base", "ignore-bloat").
    rule_id: String,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(args),
        Command::Explain(args) => cmd_explain(args),
        Command::ListRules(args) => cmd_list_rules(args),
    }
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let context_dir = args.context;

    // Load config file and merge with CLI arguments.
    let file_config =
        config::load_or_default(&context_dir).context("load imageslim.toml config")?;
    let merged = config::merge_analyze_args(
        file_config,
        args.spec,
        args.ignore_file,
        args.out_dir,
        args.image_sizes,
        args.run_costs,
    );
    debug!("merged config: {:?}", merged);

    let spec_path = context_dir.join(&merged.spec);
    let spec_text =
        fs::read_to_string(&spec_path).with_context(|| format!("read {}", spec_path))?;

    let ignore_path = context_dir.join(&merged.ignore_file);
    let ignore_text = if ignore_path.exists() {
        Some(fs::read_to_string(&ignore_path).with_context(|| format!("read {}", ignore_path))?)
    } else {
        None
    };

    let size_table = match &merged.image_sizes {
        Some(path) => {
            ImageSizeTable::builtin().merged(load_json_table(&context_dir.join(path))?)
        }
        None => ImageSizeTable::builtin(),
    };
    let cost_model = match &merged.run_costs {
        Some(path) => RunCostModel::builtin().merged(load_json_table(&context_dir.join(path))?),
        None => RunCostModel::builtin(),
    };

    let mut rule_inputs = RuleInputs::default();
    if let Some(mb) = merged.asset_threshold_mb {
        rule_inputs.asset_threshold_bytes = mb * 1_000_000;
    }
    if let Some(dir) = merged.build_output_dir {
        rule_inputs.build_output_dir = dir;
    }
    if let Some(paths) = merged.asset_paths {
        rule_inputs.asset_paths = paths;
    }

    let inputs = AnalyzeInputs {
        spec_text,
        spec_path: Some(merged.spec.to_string()),
        ignore_text,
        size_table,
        cost_model,
        rule_inputs,
    };

    let scanner = FsProjectScanner::new(context_dir.clone());
    let outcome = run_analyze(&inputs, &scanner, tool_info())?;

    let out_dir = context_dir.join(&merged.out_dir);
    write_report_artifacts(&outcome, &out_dir, &FsWritePort)?;

    println!(
        "estimated image size: {} ({} layers, {} stages)",
        format_bytes(outcome.estimate.total_bytes as i64),
        outcome.spec.instruction_count(),
        outcome.spec.stages.len()
    );
    for suggestion in &outcome.suggestions {
        println!(
            "  {}: saves {} -> {}",
            suggestion.rule_id,
            format_bytes(suggestion.savings_bytes as i64),
            format_bytes(suggestion.estimated_total_bytes as i64)
        );
    }
    if outcome.suggestions.is_empty() {
        println!("  no suggestions");
    }

    info!("wrote report to {}", out_dir);
    Ok(())
}

fn load_json_table<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path))
}

fn tool_info() -> ReportToolInfo {
    ReportToolInfo {
        name: "imageslim".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let Some(meta) = explain::lookup_rule(&args.rule_id) else {
        let available = explain::list_rule_ids().join(", ");
        anyhow::bail!(
            "Unknown rule id: '{}'\n\nAvailable rules: {}",
            args.rule_id,
            available
        );
    };

    println!("================================================================================");
    println!("RULE: {}", meta.id);
    println!("================================================================================");
    println!();
    println!("{}", meta.summary);
    println!();
    println!("DETAILS");
    println!("--------------------------------------------------------------------------------");
    println!("{}", meta.detail);
    println!();

    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    let metas = imageslim_rules::rule_metas();
    match args.format {
        OutputFormat::Text => {
            println!("Available rules:\n");
            for meta in &metas {
                println!("  {:<24} {}", meta.id, meta.summary);
            }
            println!();
            println!("Use 'imageslim explain <rule-id>' for details.");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = metas
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "summary": m.summary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}
