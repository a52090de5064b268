//! Code generation errors.

use crate::generator::Phase;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error aborting a generation pass.
///
/// None of these are expected against a correct descriptor backend and a correct generator;
/// they signal a defect in one of the two, and the whole batch fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A template referenced a variable which was not supplied.
    #[error("unresolved placeholder `${name}$` in template {template:?}")]
    UnresolvedPlaceholder { name: String, template: String },

    /// A template contained an opening delimiter without a matching close.
    #[error("unterminated placeholder in template {template:?}")]
    UnterminatedPlaceholder { template: String },

    /// A descriptor reported an inconsistent state.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// A generation phase did not restore the indentation it started with.
    #[error("unbalanced indentation after {phase:?} phase: expected depth {expected}, found {actual}")]
    UnbalancedIndentation {
        phase: Phase,
        expected: usize,
        actual: usize,
    },

    /// A generator parameter could not be parsed.
    #[error("invalid generator parameter `{key}`: {reason}")]
    InvalidParameter { key: String, reason: String },

    /// A requested input file is not part of the request.
    #[error("file to generate not found in request: {0}")]
    MissingFile(String),
}

impl Error {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedDescriptor(msg.into())
    }
}
