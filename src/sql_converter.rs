//! Converts filter strings into parameterized SQL fragments.

use crate::error::ConverterError;
use crate::filter::{FilterContext, FilterKey, Param, SqlFilter};
use crate::lexer::{FilterTokenizer, LogicOperatorTokenizer, StarTokenizer, Tokenize};
use crate::parser::Parser;
use crate::token::LogicOperatorTokenKind;

/// Converts `(key, value)` filters such as `("price", "<10+>2")` into SQL.
///
/// Holds only its tokenizers; a single instance can be shared and reused.
#[derive(Debug, Clone, Default)]
pub struct SqlFilterConverter {
    filter_tokenizer: FilterTokenizer,
    logic_operator_tokenizer: LogicOperatorTokenizer,
    star_tokenizer: StarTokenizer,
}

impl SqlFilterConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a filter with an empty context.
    pub fn transform(
        &self,
        key: impl Into<FilterKey>,
        value: &str,
    ) -> Result<SqlFilter, ConverterError> {
        self.transform_with_context(key, value, &FilterContext::new())
    }

    /// Converts a filter. `context` is accepted for future variable substitution and is not read.
    pub fn transform_with_context(
        &self,
        key: impl Into<FilterKey>,
        value: &str,
        context: &FilterContext,
    ) -> Result<SqlFilter, ConverterError> {
        match key.into() {
            FilterKey::Name(key) => self.transform_complex_filter(&key, value, context),
            FilterKey::Index(_) => Err(ConverterError::ComplexFilterNotImplemented),
            FilterKey::Other(_) => Err(ConverterError::InvalidKeyType),
        }
    }

    /// Splits `value` on a top level `+` / `-` and converts both halves.
    fn transform_complex_filter(
        &self,
        key: &str,
        value: &str,
        context: &FilterContext,
    ) -> Result<SqlFilter, ConverterError> {
        let tokens = match self.logic_operator_tokenizer.tokenize(value) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::debug!(key, value, error = %err, "logic split failed, binding value as a literal");
                return Ok(literal_equality(key, value));
            }
        };

        let joiner = match tokens.as_slice() {
            [_, operator, _] => match operator.kind {
                LogicOperatorTokenKind::AndOperator => Some(" AND "),
                LogicOperatorTokenKind::OrOperator => Some(" OR "),
                _ => None,
            },
            _ => None,
        };

        let Some(joiner) = joiner else {
            return self.transform_simple_filter(key, value, context);
        };

        tracing::trace!(
            key,
            left = tokens[0].sequence,
            right = tokens[2].sequence,
            joiner = joiner.trim(),
            "compound filter"
        );

        let left = self.transform_simple_filter(key, tokens[0].sequence, context)?;
        let right = self.transform_simple_filter(key, tokens[2].sequence, context)?;

        let (left_expression, mut params) = left.into_parts();
        let (right_expression, mut right_params) = right.into_parts();
        params.append(&mut right_params);

        Ok(SqlFilter::new(
            format!("{}{}{}", left_expression, joiner, right_expression),
            params,
        ))
    }

    /// Converts a filter with no logic operator.
    fn transform_simple_filter(
        &self,
        key: &str,
        value: &str,
        _context: &FilterContext,
    ) -> Result<SqlFilter, ConverterError> {
        let tokens = match self.filter_tokenizer.tokenize(value) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::debug!(key, value, error = %err, "not a filter expression, binding value as a literal");
                return Ok(literal_equality(key, value));
            }
        };

        tracing::trace!(key, value, count = tokens.len(), "filter tokens");

        Parser::new(key, value, &tokens, &self.star_tokenizer).parse()
    }
}

/// `key = ?` with the raw value, used for anything the tokenizers reject.
fn literal_equality(key: &str, value: &str) -> SqlFilter {
    SqlFilter::new(format!("{} = ?", key), vec![Param::from(value)])
}
