//! Error kinds returned by the solver and generator.

use thiserror::Error;

/// Tagged failure kinds for every fallible operation in the crate.
///
/// Messages are informational only; callers should branch on the variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("duplicate shape id '{id}'")]
    DuplicateShapeId { id: String },

    #[error("no shape in the pool fits the per-color cell budget")]
    NoShapesFit,

    #[error("no valid placement exists for the requested shapes")]
    NoPlacement,

    #[error("all row and column requirements are zero")]
    NoRequirements,

    #[error("search exhausted without finding a solution")]
    NoSolution,

    #[error("generation deadline of {budget_ms} ms exceeded")]
    DeadlineExceeded { budget_ms: u64 },
}

impl PuzzleError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
