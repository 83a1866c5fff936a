//! Rule-driven tokenizers for the filter language.
//!
//! ## 扫描流程
//!
//! ```text
//! tokenize(input)
//!   └─ while remaining != ""
//!        ├─ try each rule in insertion order (anchored at the start)
//!        │    └─ first match wins → emit Token, advance past the match
//!        └─ no rule matched → TokenizerError
//! ```
//!
//! Precedence is the order in which rules were added, not the length of the
//! match, so every concrete tokenizer below is order sensitive.

use regex::Regex;

use crate::error::TokenizerError;
use crate::token::{
    FilterToken, FilterTokenKind, LogicOperatorToken, LogicOperatorTokenKind, Span, StarToken,
    StarTokenKind, Token,
};

/// Common interface of every tokenizer.
pub trait Tokenize {
    type Kind: Copy;

    fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<Token<'a, Self::Kind>>, TokenizerError>;
}

/// A pattern, anchored to the start of the remaining input, and the kind of
/// token it produces.
#[derive(Debug, Clone)]
pub struct TokenRule<K> {
    regex: Regex,
    kind: K,
}

impl<K: Copy> TokenRule<K> {
    pub fn new(pattern: &str, kind: K) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})"))?;
        Ok(Self { regex, kind })
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    /// Length of the match at the very start of `input`, if any.
    fn match_len(&self, input: &str) -> Option<usize> {
        self.regex.find(input).map(|m| m.end())
    }
}

/// Generic greedy, first-rule-wins tokenizer.
#[derive(Debug, Clone)]
pub struct Tokenizer<K> {
    rules: Vec<TokenRule<K>>,
    trim: bool,
}

impl<K: Copy> Default for Tokenizer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Tokenizer<K> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            trim: false,
        }
    }

    /// A tokenizer whose matched sequences are stripped of surrounding whitespace.
    pub fn trimmed() -> Self {
        Self {
            rules: Vec::new(),
            trim: true,
        }
    }

    /// Appends a rule; rules added earlier take precedence.
    pub fn add_rule(&mut self, pattern: &str, kind: K) -> Result<&mut Self, regex::Error> {
        self.rules.push(TokenRule::new(pattern, kind)?);
        Ok(self)
    }

    /// Builds a tokenizer from a fixed rule table.
    ///
    /// # Panics
    ///
    /// Panics if one of the patterns is not a valid regex. Only used with the
    /// constant tables of this module.
    fn from_table(trim: bool, table: &[(&str, K)]) -> Self {
        let mut tokenizer = if trim { Self::trimmed() } else { Self::new() };
        for (pattern, kind) in table {
            tokenizer
                .add_rule(pattern, *kind)
                .expect("Invalid token pattern");
        }
        tokenizer
    }

    pub fn rules(&self) -> &[TokenRule<K>] {
        &self.rules
    }

    pub fn is_trimmed(&self) -> bool {
        self.trim
    }

    /// Builds the token for a match of `len` bytes at `position`.
    fn make_token<'a>(&self, input: &'a str, position: usize, len: usize, kind: K) -> Token<'a, K> {
        let matched = &input[position..position + len];
        if !self.trim {
            return Token::new(kind, matched, Span::new(position, position + len));
        }

        let leading = matched.len() - matched.trim_start().len();
        let sequence = matched.trim();
        let start = position + leading;
        Token::new(kind, sequence, Span::new(start, start + sequence.len()))
    }
}

impl<K: Copy> Tokenize for Tokenizer<K> {
    type Kind = K;

    fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<Token<'a, K>>, TokenizerError> {
        let mut tokens = Vec::new();
        let mut position = 0;

        while position < input.len() {
            let remaining = &input[position..];

            // 零长度匹配不能推进位置，视为不匹配
            let matched = self.rules.iter().find_map(|rule| {
                rule.match_len(remaining)
                    .filter(|len| *len > 0)
                    .map(|len| (rule.kind, len))
            });

            let Some((kind, len)) = matched else {
                return Err(TokenizerError::new(position, remaining));
            };

            tokens.push(self.make_token(input, position, len, kind));
            position += len;
        }

        Ok(tokens)
    }
}

// WARNING: order is significant in every table below.

const FILTER_RULES: &[(&str, FilterTokenKind)] = &[
    (r"\)", FilterTokenKind::CloseBracket),
    (r",", FilterTokenKind::Comma),
    (r"=", FilterTokenKind::EqualTo),
    (r">=", FilterTokenKind::GreaterThanOrEqual),
    (r">", FilterTokenKind::GreaterThan),
    (r"<=", FilterTokenKind::LessThanOrEqual),
    (r"<", FilterTokenKind::LessThan),
    (r"in", FilterTokenKind::In),
    (r"~", FilterTokenKind::Like),
    (r"!", FilterTokenKind::Not),
    (r"'[^']*'", FilterTokenKind::String),
    (r"[0-9]+(?:\.[0-9]+)?", FilterTokenKind::Number),
    (r"\(", FilterTokenKind::OpenBracket),
];

const LOGIC_OPERATOR_RULES: &[(&str, LogicOperatorTokenKind)] = &[
    // Logic operators
    (r"\+", LogicOperatorTokenKind::AndOperator),
    (r"-", LogicOperatorTokenKind::OrOperator),
    // Raw values
    (r"[0-9.]+", LogicOperatorTokenKind::Number),
    (r"'[^']+'", LogicOperatorTokenKind::String),
    // Quoted values behind a simple operator, so that '+' and '-' inside
    // quotes are never read as logic operators
    (r"~'[^']+'", LogicOperatorTokenKind::String),
    (r"='[^']+'", LogicOperatorTokenKind::String),
    (r"<'[^']+'", LogicOperatorTokenKind::String),
    (r"<='[^']+'", LogicOperatorTokenKind::String),
    (r">'[^']+'", LogicOperatorTokenKind::String),
    (r">='[^']+'", LogicOperatorTokenKind::String),
    (r"!'[^']+'", LogicOperatorTokenKind::String),
    // Anything else up to the next quote or logic operator
    (r"[^'+\-]+", LogicOperatorTokenKind::String),
];

const STAR_RULES: &[(&str, StarTokenKind)] = &[
    (r"\*", StarTokenKind::Star),
    (r"[^*]+", StarTokenKind::Text),
];

/// Tokenizer for simple filter expressions such as `>=10`, `~'*word*'` or `!in(5,12,3)`.
#[derive(Debug, Clone)]
pub struct FilterTokenizer {
    inner: Tokenizer<FilterTokenKind>,
}

impl FilterTokenizer {
    pub fn new() -> Self {
        Self {
            inner: Tokenizer::from_table(false, FILTER_RULES),
        }
    }
}

impl Default for FilterTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenize for FilterTokenizer {
    type Kind = FilterTokenKind;

    fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<FilterToken<'a>>, TokenizerError> {
        self.inner.tokenize(input)
    }
}

/// Splits a compound filter such as `<10+>2` on its top level `+` (AND) and `-` (OR).
#[derive(Debug, Clone)]
pub struct LogicOperatorTokenizer {
    inner: Tokenizer<LogicOperatorTokenKind>,
}

impl LogicOperatorTokenizer {
    pub fn new() -> Self {
        Self {
            inner: Tokenizer::from_table(true, LOGIC_OPERATOR_RULES),
        }
    }
}

impl Default for LogicOperatorTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenize for LogicOperatorTokenizer {
    type Kind = LogicOperatorTokenKind;

    fn tokenize<'a>(
        &self,
        input: &'a str,
    ) -> Result<Vec<LogicOperatorToken<'a>>, TokenizerError> {
        self.inner.tokenize(input)
    }
}

/// Splits a string into `*` markers and the literal runs between them.
#[derive(Debug, Clone)]
pub struct StarTokenizer {
    inner: Tokenizer<StarTokenKind>,
}

impl StarTokenizer {
    pub fn new() -> Self {
        Self {
            inner: Tokenizer::from_table(false, STAR_RULES),
        }
    }

    /// Infallible variant of [`Tokenize::tokenize`].
    ///
    /// The two rules cover every input, the whole-string fallback is never
    /// reached in practice.
    pub fn split<'a>(&self, input: &'a str) -> Vec<StarToken<'a>> {
        self.inner.tokenize(input).unwrap_or_else(|_| {
            vec![Token::new(
                StarTokenKind::Text,
                input,
                Span::new(0, input.len()),
            )]
        })
    }
}

impl Default for StarTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenize for StarTokenizer {
    type Kind = StarTokenKind;

    fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<StarToken<'a>>, TokenizerError> {
        Ok(self.split(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequences<'a, K: Copy>(tokens: &[Token<'a, K>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.sequence).collect()
    }

    fn filter_kinds(input: &str) -> Vec<FilterTokenKind> {
        FilterTokenizer::new()
            .tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_engine_first_rule_wins() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule("a", 1).unwrap().add_rule("ab", 2).unwrap();

        let tokens = tokenizer.tokenize("ab");
        // "a" wins, then nothing matches "b"
        assert_eq!(tokens.unwrap_err(), TokenizerError::new(1, "b"));

        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule("ab", 2).unwrap().add_rule("a", 1).unwrap();
        let tokens = tokenizer.tokenize("aba").unwrap();
        assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_engine_never_searches_mid_string() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule("[0-9]+", ()).unwrap();

        let err = tokenizer.tokenize("x12").unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.remaining, "x12");
    }

    #[test]
    fn test_engine_rejects_zero_length_match() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.add_rule("[0-9]*", ()).unwrap();

        assert_eq!(tokenizer.tokenize("12").unwrap().len(), 1);
        assert!(tokenizer.tokenize("12a").is_err());
    }

    #[test]
    fn test_engine_empty_input() {
        let tokenizer: Tokenizer<()> = Tokenizer::new();
        assert!(tokenizer.tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_engine_invalid_pattern() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.add_rule("(", ()).is_err());
        assert!(tokenizer.rules().is_empty());
    }

    #[test]
    fn test_builtin_rule_tables() {
        let filter = FilterTokenizer::new();
        assert!(!filter.inner.is_trimmed());
        assert_eq!(filter.inner.rules().len(), 13);
        assert_eq!(filter.inner.rules()[0].kind(), FilterTokenKind::CloseBracket);

        let position = |kind| {
            filter
                .inner
                .rules()
                .iter()
                .position(|rule| rule.kind() == kind)
                .unwrap()
        };
        assert!(position(FilterTokenKind::GreaterThanOrEqual) < position(FilterTokenKind::GreaterThan));
        assert!(position(FilterTokenKind::LessThanOrEqual) < position(FilterTokenKind::LessThan));

        assert!(LogicOperatorTokenizer::new().inner.is_trimmed());
        assert!(!StarTokenizer::new().inner.is_trimmed());
    }

    #[test]
    fn test_trimmed_spans() {
        let mut tokenizer = Tokenizer::trimmed();
        tokenizer.add_rule("[^+]+", 'v').unwrap().add_rule(r"\+", '+').unwrap();

        let tokens = tokenizer.tokenize(" a +b ").unwrap();
        assert_eq!(sequences(&tokens), vec!["a", "+", "b"]);
        assert_eq!(tokens[0].span, Span::new(1, 2));
        assert_eq!(tokens[2].span, Span::new(4, 5));
    }

    #[test]
    fn test_filter_two_char_operators() {
        assert_eq!(
            filter_kinds(">=5"),
            vec![FilterTokenKind::GreaterThanOrEqual, FilterTokenKind::Number]
        );
        assert_eq!(
            filter_kinds("<=14.69"),
            vec![FilterTokenKind::LessThanOrEqual, FilterTokenKind::Number]
        );
        assert_eq!(filter_kinds(">5"), vec![FilterTokenKind::GreaterThan, FilterTokenKind::Number]);
        assert_eq!(filter_kinds("<5"), vec![FilterTokenKind::LessThan, FilterTokenKind::Number]);

        let tokens = FilterTokenizer::new().tokenize("<=14.69").unwrap();
        assert_eq!(sequences(&tokens), vec!["<=", "14.69"]);
    }

    #[test]
    fn test_filter_equal_and_strings() {
        let tokenizer = FilterTokenizer::new();

        let tokens = tokenizer.tokenize("='*word1 *word2*'").unwrap();
        assert_eq!(sequences(&tokens), vec!["=", "'*word1 *word2*'"]);
        assert_eq!(tokens[1].kind, FilterTokenKind::String);

        let tokens = tokenizer.tokenize("='5*'").unwrap();
        assert_eq!(sequences(&tokens), vec!["=", "'5*'"]);

        let tokens = tokenizer.tokenize("~'Nantes'").unwrap();
        assert_eq!(sequences(&tokens), vec!["~", "'Nantes'"]);
        assert_eq!(tokens[0].kind, FilterTokenKind::Like);
    }

    #[test]
    fn test_filter_not() {
        let tokenizer = FilterTokenizer::new();

        let tokens = tokenizer.tokenize("!'This is a test'").unwrap();
        assert_eq!(sequences(&tokens), vec!["!", "'This is a test'"]);
        assert_eq!(filter_kinds("!14.69"), vec![FilterTokenKind::Not, FilterTokenKind::Number]);
    }

    #[test]
    fn test_filter_in_lists() {
        let tokenizer = FilterTokenizer::new();

        let tokens = tokenizer.tokenize("in(5.23,2.96,1.47)").unwrap();
        assert_eq!(
            sequences(&tokens),
            vec!["in", "(", "5.23", ",", "2.96", ",", "1.47", ")"]
        );

        let tokens = tokenizer.tokenize("!in('string1','string 2','string_3')").unwrap();
        assert_eq!(
            sequences(&tokens),
            vec!["!", "in", "(", "'string1'", ",", "'string 2'", ",", "'string_3'", ")"]
        );
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                FilterTokenKind::Not,
                FilterTokenKind::In,
                FilterTokenKind::OpenBracket,
                FilterTokenKind::String,
                FilterTokenKind::Comma,
                FilterTokenKind::String,
                FilterTokenKind::Comma,
                FilterTokenKind::String,
                FilterTokenKind::CloseBracket,
            ]
        );
    }

    #[test]
    fn test_filter_rejects_free_text() {
        let tokenizer = FilterTokenizer::new();

        let err = tokenizer.tokenize("Sample string").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(tokenizer.tokenize("in(5, 7)").is_err());
        assert!(tokenizer.tokenize("1.2.3").is_err());
    }

    #[test]
    fn test_logic_operator_split() {
        let tokenizer = LogicOperatorTokenizer::new();

        let tokens = tokenizer.tokenize(">=10+<50").unwrap();
        assert_eq!(sequences(&tokens), vec![">=10", "+", "<50"]);
        assert_eq!(tokens[1].kind, LogicOperatorTokenKind::AndOperator);

        let tokens = tokenizer.tokenize(">=10.1-<50.2").unwrap();
        assert_eq!(sequences(&tokens), vec![">=10.1", "-", "<50.2"]);
        assert_eq!(tokens[1].kind, LogicOperatorTokenKind::OrOperator);

        let tokens = tokenizer.tokenize(">=10.1+<50.2-=60.3").unwrap();
        assert_eq!(sequences(&tokens), vec![">=10.1", "+", "<50.2", "-", "=60.3"]);
    }

    #[test]
    fn test_logic_operator_keeps_quoted_values() {
        let tokenizer = LogicOperatorTokenizer::new();

        let tokens = tokenizer.tokenize(">='2017-01-01T00:09:01+01:00'").unwrap();
        assert_eq!(sequences(&tokens), vec![">='2017-01-01T00:09:01+01:00'"]);

        let tokens = tokenizer.tokenize("~'*ball*'-~'*tennis*'").unwrap();
        assert_eq!(sequences(&tokens), vec!["~'*ball*'", "-", "~'*tennis*'"]);

        let tokens = tokenizer.tokenize("54.12").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, LogicOperatorTokenKind::Number);
    }

    #[test]
    fn test_logic_operator_trims() {
        let tokens = LogicOperatorTokenizer::new().tokenize("Handball + Football").unwrap();
        assert_eq!(sequences(&tokens), vec!["Handball", "+", "Football"]);
    }

    #[test]
    fn test_logic_operator_unterminated_quote() {
        assert!(LogicOperatorTokenizer::new().tokenize("'abc").is_err());
    }

    #[test]
    fn test_star_split() {
        let tokenizer = StarTokenizer::new();

        let tokens = tokenizer.split("this is a test string");
        assert_eq!(sequences(&tokens), vec!["this is a test string"]);

        assert_eq!(sequences(&tokenizer.split("*word")), vec!["*", "word"]);
        assert_eq!(sequences(&tokenizer.split("word*")), vec!["word", "*"]);
        assert_eq!(sequences(&tokenizer.split("word1*word2")), vec!["word1", "*", "word2"]);

        let tokens = tokenizer.split("*word1 *word2*");
        assert_eq!(sequences(&tokens), vec!["*", "word1 ", "*", "word2", "*"]);
        assert_eq!(tokens[0].kind, StarTokenKind::Star);
        assert_eq!(tokens[1].kind, StarTokenKind::Text);

        assert!(tokenizer.split("").is_empty());
    }
}
