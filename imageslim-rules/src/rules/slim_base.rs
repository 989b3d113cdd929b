use crate::{Rule, RuleContext, build_suggestion};
use imageslim_types::spec::StageBase;
use imageslim_types::suggestion::Suggestion;

/// Swap the final stage's base image for a known slimmer variant.
pub struct SlimBase;

impl SlimBase {
    pub const RULE_ID: &'static str = "slim-base";
}

impl Rule for SlimBase {
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
        let Some(slim) = ctx.inputs.slim_variants.get(reference) else {
            return Ok(None);
        };
        // Without a size entry for the variant there is no honest estimate.
        if slim == reference || !ctx.size_table.contains(slim) {
            return Ok(None);
        }

        let mut rewritten = ctx.spec.clone();
        if let Some(stage) = rewritten.stages.last_mut() {
            stage.base = StageBase::Image {
                reference: slim.clone(),
            };
            if let Some(from) = stage.instructions.first_mut() {
                from.args = vec![slim.clone()];
            }
        }

        let suggestion = build_suggestion(
            ctx,
            Self::RULE_ID,
            format!("Swap final stage base `{reference}` for slimmer `{slim}`"),
            rewritten,
            ctx.files,
            vec![],
            vec![],
        )?;

        if suggestion.savings_bytes == 0 {
            return Ok(None);
        }
        Ok(Some(suggestion))
    }
}
