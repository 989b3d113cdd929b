use crate::{Rule, RuleContext, build_suggestion};
use imageslim_types::spec::StageBase;
use imageslim_types::suggestion::Suggestion;

/// Swap a general-purpose final base for a minimal runtime image when the
/// final stage needs neither a shell nor a package manager (heuristic: it
/// has no RUN instructions).
pub struct DistrolessSwap;

impl DistrolessSwap {
    pub const RULE_ID: &'static str = "distroless-swap";
}

impl Rule for DistrolessSwap {
    fn id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Suggestion>> {
        let Some(final_stage) = ctx.spec.final_stage() else {
            return Ok(None);
        };
        let StageBase::Image { reference } = &final_stage.base else {
            return Ok(None);
        };
        if reference.starts_with("gcr.io/distroless") {
            return Ok(None);
        }

        // Family = repo name before the tag, registry path stripped.
        let family = reference
            .split(':')
            .next()
            .unwrap_or(reference)
            .rsplit('/')
            .next()
            .unwrap_or(reference)
            .split('-')
            .next()
            .unwrap_or(reference);
        let Some(minimal) = ctx.inputs.runtime_bases.get(family) else {
            return Ok(None);
        };
        if minimal == reference || !ctx.size_table.contains(minimal) {
            return Ok(None);
        }
        if final_stage.has_run_instructions() {
            return Ok(None);
        }

        let mut rewritten = ctx.spec.clone();
        if let Some(stage) = rewritten.stages.last_mut() {
            stage.base = StageBase::Image {
                reference: minimal.clone(),
            };
            if let Some(from) = stage.instructions.first_mut() {
                from.args = vec![minimal.clone()];
            }
        }

        let suggestion = build_suggestion(
            ctx,
            Self::RULE_ID,
            format!("Swap final stage base `{reference}` for minimal runtime `{minimal}`"),
            rewritten,
            ctx.files,
            vec![
                "the minimal base ships no shell or package manager; debug with an ephemeral container".to_string(),
            ],
            vec![],
        )?;

        if suggestion.savings_bytes == 0 {
            return Ok(None);
        }
        Ok(Some(suggestion))
    }
}
