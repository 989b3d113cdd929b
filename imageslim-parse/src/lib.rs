//! Build-spec parsing and printing.
//!
//! `parse` and `print` are inverses for well-formed input: printing emits the
//! canonical single-space, uppercase-keyword form, and parsing that text
//! reproduces the same instruction sequence.

mod error;

pub use error::ParseError;

use imageslim_types::spec::{BuildInstruction, BuildSpec, InstructionKind, Stage, StageBase};
use tracing::debug;

/// Parse build-spec text into typed stages.
///
/// Stages split on FROM. A FROM base naming an earlier stage label resolves
/// to that stage; otherwise it is taken as an image reference (a forward
/// label is indistinguishable from an image name and surfaces later as an
/// unknown base image). `COPY --from=` forward references are rejected here.
pub fn parse(text: &str) -> Result<BuildSpec, ParseError> {
    let mut stages: Vec<Stage> = Vec::new();
    let mut current: Option<Stage> = None;
    let mut next_index = 0usize;

    for (line, tokens) in logical_lines(text) {
        let keyword = &tokens[0];
        let Some(kind) = InstructionKind::from_keyword(keyword) else {
            return Err(ParseError::UnknownInstruction {
                line,
                keyword: keyword.clone(),
            });
        };
        let args: Vec<String> = tokens[1..].to_vec();

        if kind == InstructionKind::From {
            if let Some(done) = current.take() {
                stages.push(done);
            }
            let (base_ref, label) = split_from_args(&args, line)?;

            let base = match stages.iter().position(|s| s.label.as_deref() == Some(&base_ref)) {
                Some(index) => StageBase::Stage { index },
                None => StageBase::Image {
                    reference: base_ref.clone(),
                },
            };

            let mut from = BuildInstruction::new(InstructionKind::From, vec![base_ref]);
            from.index = next_index;
            from.stage_label = label.clone();
            next_index += 1;

            current = Some(Stage {
                index: stages.len(),
                label,
                base,
                instructions: vec![from],
            });
            continue;
        }

        let Some(stage) = current.as_mut() else {
            return Err(ParseError::InstructionBeforeFrom { line });
        };

        if args.is_empty() {
            return Err(ParseError::MissingArgument {
                line,
                keyword: kind.keyword().to_string(),
            });
        }

        let mut instruction = BuildInstruction::new(kind, args);
        instruction.index = next_index;
        next_index += 1;

        if kind == InstructionKind::Copy {
            instruction.copy_from = resolve_copy_from(&instruction.args, &stages, line)?;
        }

        stage.instructions.push(instruction);
    }

    if let Some(done) = current.take() {
        stages.push(done);
    }
    if stages.is_empty() {
        return Err(ParseError::Empty);
    }

    debug!(stages = stages.len(), "parsed build spec");
    Ok(BuildSpec { stages })
}

/// Re-serialize a spec, one instruction per line in canonical form.
pub fn print(spec: &BuildSpec) -> String {
    let mut out = String::new();
    for instruction in spec.instructions() {
        out.push_str(&print_instruction(instruction));
        out.push('\n');
    }
    out
}

/// One instruction in canonical form, no trailing newline.
pub fn print_instruction(instruction: &BuildInstruction) -> String {
    let mut out = String::from(instruction.kind.keyword());
    for arg in &instruction.args {
        out.push(' ');
        out.push_str(arg);
    }
    if instruction.kind == InstructionKind::From
        && let Some(label) = &instruction.stage_label
    {
        out.push_str(" AS ");
        out.push_str(label);
    }
    out
}

/// Logical lines: comments and blanks skipped, trailing-backslash
/// continuations joined. Yields (first physical line number, tokens).
fn logical_lines(text: &str) -> impl Iterator<Item = (u64, Vec<String>)> {
    let mut out: Vec<(u64, Vec<String>)> = Vec::new();
    let mut pending: Option<(u64, String)> = None;

    for (zero_based, raw) in text.lines().enumerate() {
        let line = zero_based as u64 + 1;
        let trimmed = raw.trim();

        if pending.is_none() && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }

        let (start, mut buffer) = pending.take().unwrap_or((line, String::new()));
        if !buffer.is_empty() {
            buffer.push(' ');
        }

        if let Some(stripped) = trimmed.strip_suffix('\\') {
            buffer.push_str(stripped.trim_end());
            pending = Some((start, buffer));
            continue;
        }

        buffer.push_str(trimmed);
        let tokens: Vec<String> = buffer.split_whitespace().map(str::to_string).collect();
        if !tokens.is_empty() {
            out.push((start, tokens));
        }
    }

    if let Some((start, buffer)) = pending {
        let tokens: Vec<String> = buffer.split_whitespace().map(str::to_string).collect();
        if !tokens.is_empty() {
            out.push((start, tokens));
        }
    }

    out.into_iter()
}

/// `FROM <base>` or `FROM <base> AS <label>` (AS case-insensitive).
fn split_from_args(args: &[String], line: u64) -> Result<(String, Option<String>), ParseError> {
    match args {
        [] => Err(ParseError::MissingArgument {
            line,
            keyword: "FROM".to_string(),
        }),
        [base] => Ok((base.clone(), None)),
        [base, keyword, label] if keyword.eq_ignore_ascii_case("as") => {
            Ok((base.clone(), Some(label.clone())))
        }
        _ => Err(ParseError::MalformedFrom { line }),
    }
}

/// Resolve `--from=<ref>` against the stages declared so far. `<ref>` is a
/// label or a numeric stage index; anything else (including a forward
/// reference) is an error.
fn resolve_copy_from(
    args: &[String],
    earlier: &[Stage],
    line: u64,
) -> Result<Option<usize>, ParseError> {
    let Some(reference) = args.iter().find_map(|a| a.strip_prefix("--from=")) else {
        return Ok(None);
    };

    if let Some(stage) = earlier.iter().find(|s| s.label.as_deref() == Some(reference)) {
        return Ok(Some(stage.index));
    }
    if let Ok(index) = reference.parse::<usize>()
        && index < earlier.len()
    {
        return Ok(Some(index));
    }

    Err(ParseError::UnknownStage {
        line,
        reference: reference.to_string(),
    })
}
