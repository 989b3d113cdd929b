//! Parse-time errors. All fatal; every variant carries the offending line
//! so the caller can locate the cause without re-reading the spec.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("build spec contains no instructions")]
    Empty,

    #[error("line {line}: unrecognized instruction `{keyword}`")]
    UnknownInstruction { line: u64, keyword: String },

    #[error("line {line}: {keyword} requires arguments")]
    MissingArgument { line: u64, keyword: String },

    #[error("line {line}: malformed FROM (expected `FROM <base> [AS <label>]`)")]
    MalformedFrom { line: u64 },

    #[error("line {line}: instruction before the first FROM")]
    InstructionBeforeFrom { line: u64 },

    /// `COPY --from=` may only reference a stage declared earlier in the
    /// file; forward references are rejected.
    #[error("line {line}: COPY --from references unknown stage `{reference}`")]
    UnknownStage { line: u64, reference: String },
}

impl ParseError {
    /// Line number the error points at, when it has one.
    pub fn line(&self) -> Option<u64> {
        match self {
            ParseError::Empty => None,
            ParseError::UnknownInstruction { line, .. }
            | ParseError::MissingArgument { line, .. }
            | ParseError::MalformedFrom { line }
            | ParseError::InstructionBeforeFrom { line }
            | ParseError::UnknownStage { line, .. } => Some(*line),
        }
    }
}
