use crate::{Rule, RuleContext, build_suggestion};
use imageslim_ignore::{compile_patterns, rule_matches};
use imageslim_types::files::{FileEntry, total_bytes};
use imageslim_types::suggestion::Suggestion;

/// Propose ignore rules for known-bloat paths still present in the context.
///
/// The context files handed to the engine are already post-ignore, so any
/// bloat-pattern hit means the path is not excluded yet.
pub struct IgnoreBloat;

impl IgnoreBloat {
    pub const RULE_ID: &'static str = "ignore-bloat";
}

impl Rule for IgnoreBloat {
    fn id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Suggestion>> {
        let compiled = compile_patterns(&ctx.inputs.bloat_patterns);
        let fired: Vec<_> = compiled
            .iter()
            .filter(|rule| ctx.files.iter().any(|f| rule_matches(rule, &f.path)))
            .collect();
        if fired.is_empty() {
            return Ok(None);
        }

        let pruned: Vec<FileEntry> = ctx
            .files
            .iter()
            .filter(|f| !fired.iter().any(|rule| rule_matches(rule, &f.path)))
            .cloned()
            .collect();

        let excluded = total_bytes(ctx.files).saturating_sub(total_bytes(&pruned));
        let added: Vec<String> = fired.iter().map(|rule| rule.raw.clone()).collect();
        let notes = fired
            .iter()
            .map(|rule| {
                let bytes: u64 = ctx
                    .files
                    .iter()
                    .filter(|f| rule_matches(rule, &f.path))
                    .map(|f| f.size_bytes)
                    .sum();
                format!("`{}` currently contributes ~{} MB", rule.raw, bytes / 1_000_000)
            })
            .collect();

        let suggestion = build_suggestion(
            ctx,
            Self::RULE_ID,
            format!(
                "Add {} ignore rule(s) to drop ~{} MB of known bloat from the build context",
                added.len(),
                excluded / 1_000_000
            ),
            ctx.spec.clone(),
            &pruned,
            notes,
            added,
        )?;
        Ok(Some(suggestion))
    }
}
