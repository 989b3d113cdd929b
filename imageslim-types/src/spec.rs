//! Typed build-spec model: instructions, stages, and the spec itself.
//!
//! Everything here is immutable once parsed. Rewrites (see `imageslim-rules`)
//! build a whole new `BuildSpec` and call [`BuildSpec::reindex`] rather than
//! editing in place.

use serde::{Deserialize, Serialize};

/// The closed set of recognized instruction keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstructionKind {
    From,
    Copy,
    Run,
    Workdir,
    Cmd,
    Expose,
    Env,
    Arg,
    Entrypoint,
    User,
    Label,
}

impl InstructionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            InstructionKind::From => "FROM",
            InstructionKind::Copy => "COPY",
            InstructionKind::Run => "RUN",
            InstructionKind::Workdir => "WORKDIR",
            InstructionKind::Cmd => "CMD",
            InstructionKind::Expose => "EXPOSE",
            InstructionKind::Env => "ENV",
            InstructionKind::Arg => "ARG",
            InstructionKind::Entrypoint => "ENTRYPOINT",
            InstructionKind::User => "USER",
            InstructionKind::Label => "LABEL",
        }
    }

    /// Case-insensitive keyword lookup. `None` means the keyword is not part
    /// of the closed instruction set.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "FROM" => InstructionKind::From,
            "COPY" => InstructionKind::Copy,
            "RUN" => InstructionKind::Run,
            "WORKDIR" => InstructionKind::Workdir,
            "CMD" => InstructionKind::Cmd,
            "EXPOSE" => InstructionKind::Expose,
            "ENV" => InstructionKind::Env,
            "ARG" => InstructionKind::Arg,
            "ENTRYPOINT" => InstructionKind::Entrypoint,
            "USER" => InstructionKind::User,
            "LABEL" => InstructionKind::Label,
            _ => return None,
        };
        Some(kind)
    }
}

/// One step of a build spec.
///
/// `index` is the position in the flattened instruction sequence across all
/// stages; the estimator keys per-layer bytes by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInstruction {
    pub index: usize,
    pub kind: InstructionKind,

    /// Whitespace-split argument tokens, flags included, as written.
    /// For FROM this is just the base ref; the `AS <label>` clause lives in
    /// `stage_label`.
    pub args: Vec<String>,

    /// Stage label from `FROM <base> AS <label>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_label: Option<String>,

    /// Resolved earlier-stage index from `COPY --from=<ref>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_from: Option<usize>,
}

impl BuildInstruction {
    pub fn new(kind: InstructionKind, args: Vec<String>) -> Self {
        Self {
            index: 0,
            kind,
            args,
            stage_label: None,
            copy_from: None,
        }
    }

    /// COPY source patterns: every arg except flags and the destination.
    pub fn copy_sources(&self) -> &[String] {
        debug_assert_eq!(self.kind, InstructionKind::Copy);
        let non_flag_start = self
            .args
            .iter()
            .position(|a| !a.starts_with("--"))
            .unwrap_or(self.args.len());
        let positional = &self.args[non_flag_start..];
        match positional.len() {
            0 | 1 => &[],
            n => &positional[..n - 1],
        }
    }
}

/// What a stage starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageBase {
    /// An image reference, e.g. `node:18-alpine`.
    Image { reference: String },
    /// An earlier stage of the same spec, by index.
    Stage { index: usize },
}

/// A labeled or positionally-indexed run of instructions sharing one base.
///
/// `instructions[0]` is always the FROM that opened the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub index: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub base: StageBase,
    pub instructions: Vec<BuildInstruction>,
}

impl Stage {
    /// The base ref as written in the FROM line.
    pub fn base_ref(&self) -> &str {
        self.instructions
            .first()
            .and_then(|i| i.args.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_run_instructions(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| i.kind == InstructionKind::Run)
    }
}

/// An ordered list of stages; later stages may copy from earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub stages: Vec<Stage>,
}

impl BuildSpec {
    /// Build a spec from stages, assigning stage and instruction indices.
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        let mut spec = Self { stages };
        spec.reindex();
        spec
    }

    /// Only the final stage's contents ship in the built image.
    pub fn final_stage(&self) -> Option<&Stage> {
        self.stages.last()
    }

    pub fn stage_by_label(&self, label: &str) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.label.as_deref() == Some(label))
    }

    /// Flattened instruction sequence, in file order.
    pub fn instructions(&self) -> impl Iterator<Item = &BuildInstruction> {
        self.stages.iter().flat_map(|s| s.instructions.iter())
    }

    pub fn instruction_count(&self) -> usize {
        self.stages.iter().map(|s| s.instructions.len()).sum()
    }

    /// Reassign stage and global instruction indices in file order.
    pub fn reindex(&mut self) {
        let mut next = 0usize;
        for (stage_index, stage) in self.stages.iter_mut().enumerate() {
            stage.index = stage_index;
            for instruction in stage.instructions.iter_mut() {
                instruction.index = next;
                next += 1;
            }
        }
    }
}
