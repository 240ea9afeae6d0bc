//! Error types for the round layer.

/// Errors raised while building an [`OptionSet`](crate::OptionSet).
///
/// All variants are data-quality faults: the round cannot start, but
/// nothing is lost. The caller can fetch again or start over.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionSetError {
    /// The catalog returned too few distinct names to fill the set.
    #[error("need {needed} distinct distractors, catalog offered {available}")]
    InsufficientDistractors { needed: usize, available: usize },

    /// An option set must hold at least the correct answer.
    #[error("option set size must be at least 1")]
    EmptyOptionSet,

    /// A received option list names the same destination twice.
    #[error("duplicate option: {0}")]
    DuplicateOption(String),
}

/// Errors raised while composing a share link.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteError {
    /// The base URL the link is appended to could not be parsed.
    #[error("invalid share base url: {0}")]
    InvalidBase(#[from] url::ParseError),
}
