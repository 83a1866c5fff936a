//! Inputs and outputs of a filter conversion.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use sea_query::{Expr, QueryBuilder, SimpleExpr, Value, Values};
use serde::{Deserialize, Serialize};

use crate::datetime::{DateTimeParseError, FormatDateTimeParser};

/// Variables made available to a conversion. Reserved, the converter does not read it yet.
pub type FilterContext = HashMap<String, serde_json::Value>;

/// The key a filter applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKey {
    /// A single property name, e.g. `price`.
    Name(String),
    /// Reserved for filters spanning several properties.
    Index(i64),
    /// Any other kind of key, always rejected.
    Other(serde_json::Value),
}

impl From<&str> for FilterKey {
    fn from(name: &str) -> Self {
        FilterKey::Name(name.to_string())
    }
}

impl From<String> for FilterKey {
    fn from(name: String) -> Self {
        FilterKey::Name(name)
    }
}

impl From<&String> for FilterKey {
    fn from(name: &String) -> Self {
        FilterKey::Name(name.clone())
    }
}

impl From<i64> for FilterKey {
    fn from(index: i64) -> Self {
        FilterKey::Index(index)
    }
}

impl From<f64> for FilterKey {
    fn from(value: f64) -> Self {
        FilterKey::Other(serde_json::Value::from(value))
    }
}

impl From<bool> for FilterKey {
    fn from(value: bool) -> Self {
        FilterKey::Other(serde_json::Value::Bool(value))
    }
}

impl From<serde_json::Value> for FilterKey {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(name) => FilterKey::Name(name),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(index) => FilterKey::Index(index),
                None => FilterKey::Other(serde_json::Value::Number(n)),
            },
            other => FilterKey::Other(other),
        }
    }
}

/// A bound prepared statement parameter.
///
/// Integers and floats stay distinct so that drivers bind them with the right type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Float(f64),
    String(String),
}

impl Param {
    /// Parses the text of a NUMBER token: all digits gives an integer, anything else a float.
    ///
    /// Returns `None` when the text is not a number at all.
    pub fn parse_number(text: &str) -> Option<Self> {
        let all_digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
        if all_digits {
            if let Ok(n) = text.parse::<i64>() {
                return Some(Param::Int(n));
            }
        }
        text.parse::<f64>().ok().map(Param::Float)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::String(s) => Some(s),
            _ => None,
        }
    }

    /// Validates a string parameter as a date with the given parser.
    pub fn parse_datetime(
        &self,
        parser: &FormatDateTimeParser,
    ) -> Option<Result<DateTime<FixedOffset>, DateTimeParseError>> {
        self.as_str().map(|s| parser.parse(s))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(n) => write!(f, "{}", n),
            Param::Float(x) => write!(f, "{}", x),
            Param::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Int(n)
    }
}

impl From<f64> for Param {
    fn from(x: f64) -> Self {
        Param::Float(x)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::String(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::String(s)
    }
}

impl From<Param> for Value {
    fn from(param: Param) -> Self {
        match param {
            Param::Int(n) => Value::BigInt(Some(n)),
            Param::Float(x) => Value::Double(Some(x)),
            Param::String(s) => Value::String(Some(Box::new(s))),
        }
    }
}

/// An SQL expression with `?` placeholders and the parameters bound to them, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlFilter {
    pub expression: String,
    pub params: Vec<Param>,
}

impl SqlFilter {
    pub fn new(expression: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            expression: expression.into(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.expression, self.params)
    }

    /// Number of `?` placeholders in the expression. Always equals `params.len()`.
    pub fn placeholder_count(&self) -> usize {
        self.expression.matches('?').count()
    }

    /// The parameters as sea-query values, ready to be bound.
    pub fn to_values(&self) -> Values {
        Values(self.params.iter().cloned().map(Value::from).collect())
    }

    /// The filter as a sea-query expression, for use in `and_where` and friends.
    ///
    /// `?` markers are rewritten to the placeholder style of `builder`
    /// (`$1`, `$2`... for Postgres) so that sea-query binds every parameter.
    /// An empty filter matches everything.
    pub fn to_simple_expr<B: QueryBuilder>(&self, builder: &B) -> SimpleExpr {
        if self.is_empty() {
            return Expr::val(true).into();
        }

        let (placeholder, numbered) = builder.placeholder();
        let mut expression = String::with_capacity(self.expression.len() + self.params.len());
        let mut index = 0;
        for c in self.expression.chars() {
            if c != '?' {
                expression.push(c);
                continue;
            }
            index += 1;
            expression.push_str(placeholder);
            if numbered {
                expression.push_str(&index.to_string());
            }
        }

        Expr::cust_with_values(expression, self.params.iter().cloned().map(Value::from))
    }
}

impl fmt::Display for SqlFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}
