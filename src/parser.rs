//! Recursive-descent parser turning filter tokens into SQL.
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_from_first_token(tokens, after_not = false)
//!        ├─ "="            → key = ?  |  key like ?  (string with '*')
//!        ├─ ">" ">=" "<" "<=" → key OP ?           (forbidden after '!')
//!        ├─ "~"            → key like ?  |  cast(key as varchar(32)) like ?
//!        ├─ "!"            → parse_from_first_token(tokens[1..], after_not = true)
//!        │                   or key = !?  for a bare value
//!        ├─ "in"           → key in(?,?,...)  |  not in(?,?,...)
//!        ├─ NUMBER         → key = ?
//!        └─ STRING / other → invalid expression
//! ```
//!
//! ## 否定规则
//!
//! `!` followed by a full expression re-parses the rest of the token slice with
//! `after_not` set. The key is then followed by `!` unless the sub-expression
//! already negates itself (`not like`, `not in`):
//!
//! ```text
//! !=10          → property != ?
//! !='*a*'       → property not like ?
//! !in(1,2)      → property not in(?,?)
//! !10           → property = !?
//! ```
//!
//! Errors always report the full filter value, even from nested calls.

use crate::error::ConverterError;
use crate::filter::{Param, SqlFilter};
use crate::lexer::StarTokenizer;
use crate::token::{FilterToken, FilterTokenKind, StarTokenKind};

pub struct Parser<'a> {
    key: &'a str,
    value: &'a str,
    tokens: &'a [FilterToken<'a>],
    star_tokenizer: &'a StarTokenizer,
}

impl<'a> Parser<'a> {
    pub fn new(
        key: &'a str,
        value: &'a str,
        tokens: &'a [FilterToken<'a>],
        star_tokenizer: &'a StarTokenizer,
    ) -> Self {
        Self {
            key,
            value,
            tokens,
            star_tokenizer,
        }
    }

    /// Parses the whole token list. An empty list gives an empty filter.
    pub fn parse(&self) -> Result<SqlFilter, ConverterError> {
        if self.tokens.is_empty() {
            return Ok(SqlFilter::default());
        }
        self.parse_from_first_token(self.tokens, false)
    }

    fn invalid_expression(&self) -> ConverterError {
        ConverterError::InvalidExpression(self.value.to_string())
    }

    fn parse_from_first_token(
        &self,
        tokens: &[FilterToken<'a>],
        after_not: bool,
    ) -> Result<SqlFilter, ConverterError> {
        let Some(first) = tokens.first() else {
            return Err(self.invalid_expression());
        };

        match first.kind {
            FilterTokenKind::EqualTo => self.parse_equal_to(tokens, after_not),
            FilterTokenKind::GreaterThan
            | FilterTokenKind::GreaterThanOrEqual
            | FilterTokenKind::LessThan
            | FilterTokenKind::LessThanOrEqual => self.parse_comparison(tokens, after_not),
            FilterTokenKind::Like => self.parse_like(tokens),
            FilterTokenKind::Not => self.parse_not(tokens),
            FilterTokenKind::In => self.parse_in(tokens, after_not),
            FilterTokenKind::Number => {
                if tokens.len() != 1 {
                    return Err(self.invalid_expression());
                }
                Ok(SqlFilter::new(
                    format!("{} = ?", self.key),
                    vec![self.parse_number(first)?],
                ))
            }
            // 不带运算符的字符串没有意义
            FilterTokenKind::String
            | FilterTokenKind::OpenBracket
            | FilterTokenKind::CloseBracket
            | FilterTokenKind::Comma => Err(self.invalid_expression()),
        }
    }

    /// `=value`, `='text'` or `='te*xt'`.
    fn parse_equal_to(
        &self,
        tokens: &[FilterToken<'a>],
        after_not: bool,
    ) -> Result<SqlFilter, ConverterError> {
        if tokens.len() != 2 {
            return Err(self.invalid_expression());
        }
        let second = &tokens[1];

        match second.kind {
            FilterTokenKind::Number => Ok(SqlFilter::new(
                self.operator_expression(after_not, "="),
                vec![self.parse_number(second)?],
            )),
            FilterTokenKind::String => {
                let text = unquote(second.sequence);
                let star_tokens = self.star_tokenizer.split(text);

                if star_tokens.len() > 1 {
                    // Every star becomes '%', no implicit leading or trailing wildcard
                    let like: String = star_tokens
                        .iter()
                        .map(|t| match t.kind {
                            StarTokenKind::Star => "%",
                            StarTokenKind::Text => t.sequence,
                        })
                        .collect();
                    let subject = if after_not { "not" } else { self.key };
                    Ok(SqlFilter::new(format!("{} like ?", subject), vec![Param::from(like)]))
                } else {
                    Ok(SqlFilter::new(
                        self.operator_expression(after_not, "="),
                        vec![Param::from(text)],
                    ))
                }
            }
            _ => Err(ConverterError::InvalidOperatorUse),
        }
    }

    /// `>value`, `>=value`, `<value`, `<=value`.
    fn parse_comparison(
        &self,
        tokens: &[FilterToken<'a>],
        after_not: bool,
    ) -> Result<SqlFilter, ConverterError> {
        if tokens.len() != 2 {
            return Err(self.invalid_expression());
        }

        let operator = tokens[0]
            .kind
            .sql_operator()
            .ok_or_else(|| self.invalid_expression())?;

        // A negated ordering comparison makes no sense
        if after_not {
            return Err(ConverterError::ForbiddenAfterNot(operator));
        }

        let second = &tokens[1];
        let param = match second.kind {
            FilterTokenKind::Number => self.parse_number(second)?,
            // Dates end up here; they are bound as plain strings
            FilterTokenKind::String => Param::from(unquote(second.sequence)),
            _ => return Err(ConverterError::InvalidOperatorUse),
        };

        Ok(SqlFilter::new(format!("{} {} ?", self.key, operator), vec![param]))
    }

    /// `~value` or `~'text'`, wrapped in '%' on both sides.
    fn parse_like(&self, tokens: &[FilterToken<'a>]) -> Result<SqlFilter, ConverterError> {
        if tokens.len() != 2 {
            return Err(self.invalid_expression());
        }
        let second = &tokens[1];

        match second.kind {
            FilterTokenKind::Number => Ok(SqlFilter::new(
                format!("cast({} as varchar(32)) like ?", self.key),
                vec![Param::from(format!("%{}%", second.sequence))],
            )),
            FilterTokenKind::String => {
                let star_tokens = self.star_tokenizer.split(unquote(second.sequence));
                let last = star_tokens.len().saturating_sub(1);

                let mut like = String::from("%");
                for (i, token) in star_tokens.iter().enumerate() {
                    match token.kind {
                        // A star at either end is already covered by the wrapping '%'
                        StarTokenKind::Star if i == 0 || i == last => {}
                        StarTokenKind::Star => like.push('%'),
                        StarTokenKind::Text => like.push_str(token.sequence),
                    }
                }
                like.push('%');

                Ok(SqlFilter::new(format!("{} like ?", self.key), vec![Param::from(like)]))
            }
            _ => Err(ConverterError::InvalidLikeUse),
        }
    }

    /// `!value` or `!` followed by another expression.
    fn parse_not(&self, tokens: &[FilterToken<'a>]) -> Result<SqlFilter, ConverterError> {
        let Some(second) = tokens.get(1) else {
            return Err(self.invalid_expression());
        };

        if tokens.len() > 2 {
            if second.kind == FilterTokenKind::Like {
                return Err(ConverterError::NotBeforeLike);
            }

            let inner = self.parse_from_first_token(&tokens[1..], true)?;

            let mut expression = format!("{} ", self.key);
            if !inner.expression.contains("not like ") && !inner.expression.contains("not in") {
                expression.push('!');
            }
            expression.push_str(&inner.expression);

            return Ok(SqlFilter::new(expression, inner.params));
        }

        let param = match second.kind {
            FilterTokenKind::Number => self.parse_number(second)?,
            FilterTokenKind::String => Param::from(unquote(second.sequence)),
            _ => return Err(self.invalid_expression()),
        };

        Ok(SqlFilter::new(format!("{} = !?", self.key), vec![param]))
    }

    /// `in(v1,v2,...)`, rendered as `not in(...)` after a '!'.
    fn parse_in(
        &self,
        tokens: &[FilterToken<'a>],
        after_not: bool,
    ) -> Result<SqlFilter, ConverterError> {
        if tokens.len() < 4 || tokens[1].kind != FilterTokenKind::OpenBracket {
            return Err(self.invalid_expression());
        }

        let mut expression = if after_not {
            String::from("not in(")
        } else {
            format!("{} in(", self.key)
        };
        let mut params = Vec::new();

        // 值和逗号交替出现，右括号只能出现在值之后
        let mut expect_value = true;
        let mut position = 2;
        loop {
            let Some(token) = tokens.get(position) else {
                return Err(self.invalid_expression());
            };

            match (expect_value, token.kind) {
                (true, FilterTokenKind::Number) => {
                    expression.push('?');
                    params.push(self.parse_number(token)?);
                }
                (true, FilterTokenKind::String) => {
                    expression.push('?');
                    params.push(Param::from(unquote(token.sequence)));
                }
                (false, FilterTokenKind::Comma) => expression.push(','),
                (false, FilterTokenKind::CloseBracket) => break,
                _ => return Err(self.invalid_expression()),
            }

            expect_value = !expect_value;
            position += 1;
        }

        if position != tokens.len() - 1 {
            return Err(self.invalid_expression());
        }

        expression.push(')');
        Ok(SqlFilter::new(expression, params))
    }

    /// `key = ?` or, after a '!', only `= ?` so that the caller produces `key != ?`.
    fn operator_expression(&self, after_not: bool, operator: &str) -> String {
        if after_not {
            format!("{} ?", operator)
        } else {
            format!("{} {} ?", self.key, operator)
        }
    }

    fn parse_number(&self, token: &FilterToken<'a>) -> Result<Param, ConverterError> {
        Param::parse_number(token.sequence).ok_or_else(|| self.invalid_expression())
    }
}

/// Strips the quote characters around a STRING token.
fn unquote(sequence: &str) -> &str {
    sequence
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(sequence)
}
