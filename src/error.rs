//! Error types for tokenization and conversion.

use thiserror::Error;

/// Raised when no configured rule matches the remaining input.
///
/// The converter never lets this escape: it downgrades the filter to a
/// literal equality instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unexpected character in input : {remaining}")]
pub struct TokenizerError {
    /// Byte offset at which scanning stopped.
    pub position: usize,
    /// The input left unconsumed at that offset.
    pub remaining: String,
}

impl TokenizerError {
    pub fn new(position: usize, remaining: &str) -> Self {
        Self {
            position,
            remaining: remaining.to_string(),
        }
    }
}

/// Raised for filters that tokenize but do not form a valid expression.
///
/// Messages are matched verbatim by existing callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConverterError {
    #[error("Complex filters are currently not implemented !")]
    ComplexFilterNotImplemented,

    #[error("Invalid filter key type !")]
    InvalidKeyType,

    #[error("Invalid filter expression '{0}' !")]
    InvalidExpression(String),

    #[error("Using the '!' operator before the '{0}' operator is forbidden !")]
    ForbiddenAfterNot(&'static str),

    #[error(
        "Using the '!' operator before the '~' is currently not supported, please used the '!' \
         operator with a string having '*' characters instead !"
    )]
    NotBeforeLike,

    #[error("Invalid use of operator !")]
    InvalidOperatorUse,

    #[error("Invalid use of '~' operator !")]
    InvalidLikeUse,
}
