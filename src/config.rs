//! 配置模块，负责加载交互式命令行的JSON配置文件

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::datetime::FormatDateTimeParser;
use crate::filter::FilterContext;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "filter_sql.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(String),

    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings of the interactive converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Filter key used for every converted line.
    pub key: String,
    /// chrono format of the date parser; ISO-8601 when absent.
    pub date_format: Option<String>,
    /// Passed as the conversion context.
    pub context: FilterContext,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            key: "property".to_string(),
            date_format: None,
            context: FilterContext::new(),
        }
    }
}

impl ReplConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.display().to_string()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_ref.display().to_string(),
            source,
        })
    }

    /// The date parser described by this configuration.
    pub fn date_parser(&self) -> FormatDateTimeParser {
        match &self.date_format {
            Some(format) => FormatDateTimeParser::with_format(format.as_str()),
            None => FormatDateTimeParser::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::ISO8601;
    use std::io::Write;

    #[test]
    fn test_load_valid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
            "key": "price",
            "date_format": "%d/%m/%Y %H:%M %z",
            "context": {{ "currency": "EUR" }}
        }}"#
        )
        .unwrap();

        let config = ReplConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.key, "price");
        assert_eq!(config.date_parser().format(), "%d/%m/%Y %H:%M %z");
        assert_eq!(config.context["currency"], serde_json::json!("EUR"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "key": "validity" }}"#).unwrap();

        let config = ReplConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.key, "validity");
        assert_eq!(config.date_format, None);
        assert!(config.context.is_empty());
        assert_eq!(config.date_parser().format(), ISO8601);
    }

    #[test]
    fn test_invalid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = ReplConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ReplConfig::from_json_file("non_existent_file.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_default_config() {
        let config = ReplConfig::default();
        assert_eq!(config.key, "property");
        assert_eq!(config.date_parser(), FormatDateTimeParser::new());
    }
}
