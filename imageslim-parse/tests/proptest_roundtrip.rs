//! Property tests: printing a well-formed spec and parsing it back must
//! reproduce the instruction sequence exactly.

use imageslim_parse::{parse, print};
use imageslim_types::spec::{BuildInstruction, BuildSpec, InstructionKind, Stage, StageBase};
use proptest::prelude::*;

const IMAGES: &[&str] = &[
    "node:18",
    "node:18-alpine",
    "python:3.11-slim",
    "debian:bookworm",
    "gcr.io/distroless/nodejs18-debian11",
];

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/app".to_string()),
        Just(".".to_string()),
        Just("package.json".to_string()),
        Just("npm".to_string()),
        Just("ci".to_string()),
        Just("3000".to_string()),
        Just("NODE_ENV=production".to_string()),
    ]
}

fn body_instruction() -> impl Strategy<Value = BuildInstruction> {
    let kind = prop_oneof![
        Just(InstructionKind::Run),
        Just(InstructionKind::Workdir),
        Just(InstructionKind::Cmd),
        Just(InstructionKind::Expose),
        Just(InstructionKind::Env),
    ];
    (kind, prop::collection::vec(token(), 1..4))
        .prop_map(|(kind, args)| BuildInstruction::new(kind, args))
}

/// (base choice, label?, body) per stage; bases either an image or a
/// reference to a strictly earlier stage.
fn spec_strategy() -> impl Strategy<Value = BuildSpec> {
    let stage = (
        prop::sample::select(IMAGES.to_vec()),
        prop::option::of(Just(())),
        prop::collection::vec(body_instruction(), 0..4),
        any::<bool>(),
    );
    prop::collection::vec(stage, 1..4).prop_map(|raw| {
        let mut stages: Vec<Stage> = Vec::new();
        for (stage_index, (image, labeled, body, base_on_prev)) in raw.into_iter().enumerate() {
            let label = labeled.map(|_| format!("stage{stage_index}"));

            // Reference the previous stage only when it carries a label;
            // unlabeled prior stages stay reachable by image name instead.
            let prev_label = stages
                .last()
                .and_then(|s: &Stage| s.label.clone())
                .filter(|_| base_on_prev && stage_index > 0);

            let (base_ref, base) = match prev_label {
                Some(prev) => (
                    prev,
                    StageBase::Stage {
                        index: stage_index - 1,
                    },
                ),
                None => (
                    image.to_string(),
                    StageBase::Image {
                        reference: image.to_string(),
                    },
                ),
            };

            let mut from = BuildInstruction::new(InstructionKind::From, vec![base_ref]);
            from.stage_label = label.clone();

            let mut instructions = vec![from];
            instructions.extend(body);

            // Labeled earlier stages are also fair game for COPY --from.
            if stage_index > 0
                && let Some(source) = stages.iter().find(|s| s.label.is_some())
            {
                let reference = source.label.clone().unwrap_or_default();
                let mut copy = BuildInstruction::new(
                    InstructionKind::Copy,
                    vec![format!("--from={reference}"), "/app".to_string(), "/app".to_string()],
                );
                copy.copy_from = Some(source.index);
                instructions.push(copy);
            }

            stages.push(Stage {
                index: stage_index,
                label,
                base,
                instructions,
            });
        }
        BuildSpec::from_stages(stages)
    })
}

proptest! {
    #[test]
    fn print_then_parse_is_identity(spec in spec_strategy()) {
        let text = print(&spec);
        let reparsed = parse(&text).expect("printed spec must parse");
        prop_assert_eq!(reparsed, spec);
    }

    #[test]
    fn print_is_stable_under_reparse(spec in spec_strategy()) {
        let text = print(&spec);
        let reparsed = parse(&text).expect("printed spec must parse");
        prop_assert_eq!(print(&reparsed), text);
    }
}
