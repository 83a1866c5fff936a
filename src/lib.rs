//! Translates compact query filters such as `>=10`, `~'*word*'`, `!in(5,12,3)`
//! or `<10+>2` into parameterized SQL fragments.
//!
//! ```text
//! "<10+>2"
//!   → LogicOperatorTokenizer   ["<10", "+", ">2"]
//!   → FilterTokenizer          ["<", "10"]  [">", "2"]
//!   → Parser                   "property < ?"  "property > ?"
//!   → SqlFilter                "property < ? AND property > ?"  [10, 2]
//! ```

pub mod config;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod sql_converter;
pub mod token;

pub use error::{ConverterError, TokenizerError};
pub use filter::{FilterContext, FilterKey, Param, SqlFilter};
pub use sql_converter::SqlFilterConverter;
