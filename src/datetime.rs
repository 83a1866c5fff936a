//! Date/time parsing for string operands, e.g. `>'2017-01-01T00:09:01+01:00'`.
//!
//! The converter treats every string operand as opaque text; callers use this
//! parser to check date-like operands before binding them.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// ISO-8601 with a numeric offset, `2017-01-01T00:09:01+01:00`.
pub const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%z";

/// ISO-8601 with fractional seconds, tried when [`ISO8601`] fails.
pub const ISO8601_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' date string is not compliant with the configured format '{format}' !")]
pub struct DateTimeParseError {
    pub input: String,
    pub format: String,
}

/// Parses date strings with a chrono format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDateTimeParser {
    format: String,
}

impl Default for FormatDateTimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDateTimeParser {
    pub fn new() -> Self {
        Self {
            format: ISO8601.to_string(),
        }
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn parse(&self, input: &str) -> Result<DateTime<FixedOffset>, DateTimeParseError> {
        if let Ok(date) = DateTime::parse_from_str(input, &self.format) {
            return Ok(date);
        }

        // The default format does not cover fractional seconds
        if self.format == ISO8601 {
            if let Ok(date) = DateTime::parse_from_str(input, ISO8601_FRACTIONAL) {
                return Ok(date);
            }
        }

        Err(DateTimeParseError {
            input: input.to_string(),
            format: self.format.clone(),
        })
    }
}
