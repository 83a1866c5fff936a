use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use filter_sql::config::{ReplConfig, DEFAULT_CONFIG_FILE};
use filter_sql::datetime::FormatDateTimeParser;
use filter_sql::SqlFilterConverter;

const ENV_LOG: &str = "FILTER_SQL_LOG";

fn init_logging() {
    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .compact()
        .init();
}

/// 加载配置，失败时使用默认配置
fn load_config(path: &str) -> ReplConfig {
    match ReplConfig::from_json_file(path) {
        Ok(config) => {
            tracing::info!(path, key = %config.key, "loaded configuration");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            ReplConfig::default()
        }
    }
}

fn print_help() {
    println!("Enter a filter value (e.g. >=10, ~'*word*', !in(5,12,3), <10+>2).");
    println!("  :key <name>    change the filter key");
    println!("  :date <text>   parse a date with the configured format");
    println!("  :help          show this message");
    println!("  :quit          exit");
}

/// 一行输入对应的命令
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Key(&'a str),
    Date(&'a str),
    Help,
    Quit,
    Filter(&'a str),
}

impl<'a> Command<'a> {
    fn parse(input: &'a str) -> Self {
        match input.split_once(' ') {
            Some((":key", key)) => Command::Key(key.trim()),
            Some((":date", text)) => Command::Date(text.trim()),
            // 命令缺少参数时显示帮助
            None if matches!(input, ":key" | ":date" | ":help") => Command::Help,
            None if input == ":quit" => Command::Quit,
            _ => Command::Filter(input),
        }
    }
}

fn convert(converter: &SqlFilterConverter, config: &ReplConfig, value: &str) -> Result<()> {
    match converter.transform_with_context(config.key.as_str(), value, &config.context) {
        Ok(filter) => println!("{}", serde_json::to_string_pretty(&filter)?),
        Err(e) => println!("✗ {}", e),
    }
    Ok(())
}

fn parse_date(parser: &FormatDateTimeParser, text: &str) {
    match parser.parse(text) {
        Ok(date) => println!("{}", date.to_rfc3339()),
        Err(e) => println!("✗ {}", e),
    }
}

fn main() -> Result<()> {
    init_logging();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let mut config = load_config(&path);
    let date_parser = config.date_parser();
    let converter = SqlFilterConverter::new();

    println!("--- filter_sql: filter to SQL converter ---");
    print_help();

    let mut editor = DefaultEditor::new()?;
    loop {
        let prompt = format!("{}> ", config.key);
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(input) {
            tracing::debug!(error = %e, "could not record history entry");
        }

        match Command::parse(input) {
            Command::Key(key) => config.key = key.to_string(),
            Command::Date(text) => parse_date(&date_parser, text),
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Filter(value) => convert(&converter, &config, value)?,
        }
    }

    Ok(())
}
