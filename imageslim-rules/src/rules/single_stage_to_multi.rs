use crate::{Rule, RuleContext, build_suggestion};
use imageslim_types::spec::{BuildInstruction, BuildSpec, InstructionKind, Stage, StageBase};
use imageslim_types::suggestion::Suggestion;

const BUILD_MARKERS: &[&str] = &["install", "build", "ci", "compile", "make"];

/// Split a single-stage spec that both builds and runs into a build stage
/// plus a minimal runtime stage copying only the build output directory.
///
/// Never fires on a spec that already has more than one stage.
pub struct SingleStageToMulti;

impl SingleStageToMulti {
    pub const RULE_ID: &'static str = "single-stage-to-multi";
}

fn is_build_command(command: &str) -> bool {
    command
        .split_whitespace()
        .any(|token| BUILD_MARKERS.contains(&token))
}

impl Rule for SingleStageToMulti {
    fn id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> anyhow::Result<Option<Suggestion>> {
        if ctx.spec.stages.len() != 1 {
            return Ok(None);
        }
        let stage = &ctx.spec.stages[0];
        let StageBase::Image { reference } = &stage.base else {
            return Ok(None);
        };

        let has_build_run = stage.instructions.iter().any(|i| {
            i.kind == InstructionKind::Run && is_build_command(&i.args.join(" "))
        });
        let has_start_command = stage.instructions.iter().any(|i| {
            matches!(i.kind, InstructionKind::Cmd | InstructionKind::Entrypoint)
        });
        if !has_build_run || !has_start_command {
            return Ok(None);
        }

        let build_label = stage.label.clone().unwrap_or_else(|| "build".to_string());
        let output_dir = ctx.inputs.build_output_dir.clone();

        // Build stage: everything except the runtime-only instructions.
        let mut build_instructions: Vec<BuildInstruction> = Vec::new();
        let mut from = BuildInstruction::new(InstructionKind::From, vec![reference.clone()]);
        from.stage_label = Some(build_label.clone());
        build_instructions.push(from);
        build_instructions.extend(
            stage
                .instructions
                .iter()
                .skip(1)
                .filter(|i| {
                    !matches!(
                        i.kind,
                        InstructionKind::Cmd | InstructionKind::Entrypoint | InstructionKind::Expose
                    )
                })
                .cloned(),
        );

        // Runtime stage: slim variant when the table can price it.
        let runtime_ref = ctx
            .inputs
            .slim_variants
            .get(reference)
            .filter(|slim| ctx.size_table.contains(slim))
            .cloned()
            .unwrap_or_else(|| reference.clone());

        let mut runtime_instructions = vec![BuildInstruction::new(
            InstructionKind::From,
            vec![runtime_ref.clone()],
        )];
        if let Some(workdir) = stage
            .instructions
            .iter()
            .find(|i| i.kind == InstructionKind::Workdir)
        {
            runtime_instructions.push(workdir.clone());
        }
        let mut copy = BuildInstruction::new(
            InstructionKind::Copy,
            vec![
                format!("--from={build_label}"),
                output_dir.clone(),
                output_dir.clone(),
            ],
        );
        copy.copy_from = Some(0);
        runtime_instructions.push(copy);
        runtime_instructions.extend(
            stage
                .instructions
                .iter()
                .filter(|i| {
                    matches!(
                        i.kind,
                        InstructionKind::Expose | InstructionKind::Cmd | InstructionKind::Entrypoint
                    )
                })
                .cloned(),
        );

        let rewritten = BuildSpec::from_stages(vec![
            Stage {
                index: 0,
                label: Some(build_label.clone()),
                base: StageBase::Image {
                    reference: reference.clone(),
                },
                instructions: build_instructions,
            },
            Stage {
                index: 1,
                label: None,
                base: StageBase::Image {
                    reference: runtime_ref.clone(),
                },
                instructions: runtime_instructions,
            },
        ]);

        let suggestion = build_suggestion(
            ctx,
            Self::RULE_ID,
            format!(
                "Split into a `{build_label}` stage and a `{runtime_ref}` runtime stage copying only `{output_dir}`"
            ),
            rewritten,
            ctx.files,
            vec![format!(
                "the runtime stage copies only `{output_dir}`; make sure the build writes its output there"
            )],
            vec![],
        )?;
        Ok(Some(suggestion))
    }
}
