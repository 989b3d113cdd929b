//! Optimization rule engine.
//!
//! A fixed, ordered list of independent rules. Every rule is a pure function
//! of the original (spec, estimate, files, inputs): it either proposes a
//! whole replacement spec as a [`Suggestion`] or stays silent. Rules never
//! compose implicitly; each is evaluated against the original spec, and the
//! emitted list is sorted by rule id so downstream rendering is stable
//! regardless of evaluation order.

mod inputs;
mod rules;

pub use inputs::RuleInputs;
pub use rules::{RuleMeta, builtin_rules, rule_metas};

use anyhow::Context as _;
use imageslim_estimate::{ImageSizeTable, RunCostModel, estimate};
use imageslim_types::estimate::SizeEstimate;
use imageslim_types::files::FileEntry;
use imageslim_types::spec::BuildSpec;
use imageslim_types::suggestion::Suggestion;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

/// Everything a rule may look at. Borrowed, immutable.
pub struct RuleContext<'a> {
    pub spec: &'a BuildSpec,
    pub estimate: &'a SizeEstimate,
    pub files: &'a [FileEntry],
    pub inputs: &'a RuleInputs,
    pub size_table: &'a ImageSizeTable,
    pub cost_model: &'a RunCostModel,
}

pub trait Rule {
    /// Kebab-case identifier, unique across builtin rules.
    fn id(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Suggestion>>;
}

/// Run every builtin rule against the original spec and collect the fired
/// suggestions, sorted by rule id ascending.
pub fn evaluate_all(ctx: &RuleContext<'_>) -> anyhow::Result<Vec<Suggestion>> {
    let mut suggestions = Vec::new();
    for rule in builtin_rules() {
        if let Some(suggestion) = rule
            .evaluate(ctx)
            .with_context(|| format!("rule {}", rule.id()))?
        {
            debug!(rule = rule.id(), savings = suggestion.savings_bytes, "rule fired");
            suggestions.push(suggestion);
        }
    }
    suggestions.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
    Ok(suggestions)
}

/// Build a suggestion around a candidate spec, re-estimating it with the
/// given file set (the original files, or a pruned set when the suggestion
/// adds ignore rules).
pub(crate) fn build_suggestion(
    ctx: &RuleContext<'_>,
    rule_id: &'static str,
    description: String,
    mut rewritten: BuildSpec,
    candidate_files: &[FileEntry],
    notes: Vec<String>,
    added_ignore_rules: Vec<String>,
) -> anyhow::Result<Suggestion> {
    rewritten.reindex();
    let candidate = estimate(&rewritten, candidate_files, ctx.size_table, ctx.cost_model)
        .with_context(|| format!("estimate candidate spec for {rule_id}"))?;

    Ok(Suggestion {
        id: suggestion_id(rule_id, ctx.spec),
        rule_id: rule_id.to_string(),
        description,
        rewritten,
        estimated_total_bytes: candidate.total_bytes,
        savings_bytes: ctx.estimate.total_bytes.saturating_sub(candidate.total_bytes),
        notes,
        added_ignore_rules,
    })
}

/// Deterministic id: v5(namespace, rule_id | sha256(printed spec)).
fn suggestion_id(rule_id: &str, spec: &BuildSpec) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9f, 0x1c, 0x6a, 0x0d, 0x2b, 0x74, 0x4a, 0x31, 0x9e, 0x5d, 0x83, 0x2f, 0x6c, 0x10, 0xbe,
        0x42,
    ]);

    let mut hasher = Sha256::new();
    hasher.update(imageslim_parse::print(spec).as_bytes());
    let fingerprint = hex::encode(hasher.finalize());
    Uuid::new_v5(&NAMESPACE, format!("{rule_id}|{fingerprint}").as_bytes())
}
