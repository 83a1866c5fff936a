//! The token definitions shared by every tokenizer of the filter language.

/// A token is a single unit of the language, with a specific kind and location.
///
/// `sequence` is the exact matched text (trimmed when the producing tokenizer
/// trims), quotes included for string literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a, K> {
    pub kind: K,
    pub sequence: &'a str,
    pub span: Span,
}

impl<'a, K: Copy> Token<'a, K> {
    pub fn new(kind: K, sequence: &'a str, span: Span) -> Self {
        Self { kind, sequence, span }
    }
}

/// Kinds produced by the simple filter tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterTokenKind {
    CloseBracket,       // )
    Comma,              // ,
    EqualTo,            // =
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    In,                 // in
    LessThan,           // <
    LessThanOrEqual,    // <=
    Like,               // ~
    Not,                // !
    Number,
    OpenBracket, // (
    String,      // quoted with '
}

impl FilterTokenKind {
    /// The SQL spelling of a simple operator, `None` for any other kind.
    pub fn sql_operator(self) -> Option<&'static str> {
        match self {
            FilterTokenKind::EqualTo => Some("="),
            FilterTokenKind::GreaterThan => Some(">"),
            FilterTokenKind::GreaterThanOrEqual => Some(">="),
            FilterTokenKind::LessThan => Some("<"),
            FilterTokenKind::LessThanOrEqual => Some("<="),
            FilterTokenKind::Not => Some("!"),
            _ => None,
        }
    }
}

/// Kinds produced by the logic operator tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOperatorTokenKind {
    AndOperator, // +
    OrOperator,  // -
    Number,
    String,
}

/// Kinds produced by the star tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarTokenKind {
    Star,
    Text,
}

pub type FilterToken<'a> = Token<'a, FilterTokenKind>;
pub type LogicOperatorToken<'a> = Token<'a, LogicOperatorTokenKind>;
pub type StarToken<'a> = Token<'a, StarTokenKind>;

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
