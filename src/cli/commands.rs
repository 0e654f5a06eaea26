//! CLI command implementations
//!
//! Every command loads the configuration, scans the checks directory and
//! reports on what it found. Nothing here executes statements.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::check::{CheckLoader, RejectedCheck, DEFAULT_EXTENSION};
use crate::observability::{Logger, Severity};
use crate::planner::{CompiledCheck, ExplainPlan, Statement};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_response, write_text};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding check definition documents (required)
    pub checks_dir: String,

    /// Extension of definition documents, without the dot (default "xml")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Whether compiled output includes teardown statements (default true)
    #[serde(default = "default_drop_intermediates")]
    pub drop_intermediates: bool,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_drop_intermediates() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.checks_dir.trim().is_empty() {
            return Err(CliError::config_error("checks_dir must not be empty"));
        }

        if self.extension.is_empty() {
            return Err(CliError::config_error("extension must not be empty"));
        }
        if self.extension.starts_with('.') {
            return Err(CliError::config_error(format!(
                "Invalid extension: '{}'. Give it without the leading dot.",
                self.extension
            )));
        }

        self.log_severity()?;

        Ok(())
    }

    /// Get checks directory as Path
    pub fn checks_path(&self) -> &Path {
        Path::new(&self.checks_dir)
    }

    /// Parsed log threshold
    pub fn log_severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            ))
        })
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::List { config } => list(&config),
        Command::Compile { config, check } => compile(&config, check.as_deref()),
        Command::Explain {
            config,
            check,
            file,
        } => match (check, file) {
            (_, Some(file)) => explain_file(&config, &file),
            (Some(check), None) => explain(&config, &check),
            (None, None) => Err(CliError::config_error("explain needs --check or --file")),
        },
    }
}

/// Loads configuration, applies the log threshold and scans the checks directory
fn boot(config_path: &Path) -> CliResult<(Config, CheckLoader)> {
    let config = Config::load(config_path)?;
    Logger::set_threshold(config.log_severity()?);

    let mut loader = CheckLoader::new(config.checks_path()).with_extension(&config.extension);
    loader.load_all().map_err(|e| CliError::load_failed(&e))?;

    Ok((config, loader))
}

/// List loaded checks and rejected documents
pub fn list(config_path: &Path) -> CliResult<()> {
    let (_, loader) = boot(config_path)?;

    let checks: Vec<Value> = loader
        .checks()
        .iter()
        .map(|c| {
            json!({
                "id": c.class.id,
                "item": c.class.item,
                "level": c.class.level,
                "title": c.class.title,
                "result_kind": c.result_kind,
                "stages": c.plan.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    write_response(json!({
        "checks": checks,
        "rejected": rejected_json(loader.rejected()),
    }))
}

/// Print the statements of every loaded check, or of the one named
pub fn compile(config_path: &Path, check_id: Option<&str>) -> CliResult<()> {
    let (config, loader) = boot(config_path)?;

    match check_id {
        Some(id) => {
            let check = loader.get(id).ok_or_else(|| CliError::unknown_check(id))?;
            write_response(compiled_json(check, config.drop_intermediates))
        }
        None => {
            let checks: Vec<Value> = loader
                .checks()
                .iter()
                .map(|c| compiled_json(c, config.drop_intermediates))
                .collect();
            write_response(json!({
                "checks": checks,
                "rejected": rejected_json(loader.rejected()),
            }))
        }
    }
}

/// Explain a loaded check
pub fn explain(config_path: &Path, check_id: &str) -> CliResult<()> {
    let (_, loader) = boot(config_path)?;

    let check = loader
        .get(check_id)
        .ok_or_else(|| CliError::unknown_check(check_id))?;
    write_text(&ExplainPlan::from_compiled(check).to_string())
}

/// Explain one definition document, including why it is rejected
///
/// A document inside the checks directory is explained as it loaded. Any
/// other document is a duplicate only if a loaded check holds its class id.
pub fn explain_file(config_path: &Path, file: &Path) -> CliResult<()> {
    let (_, loader) = boot(config_path)?;
    write_text(&explain_document(&loader, file).to_string())
}

fn explain_document(loader: &CheckLoader, file: &Path) -> ExplainPlan {
    match loader.inspect_file(file) {
        Ok(check) => ExplainPlan::from_compiled(&check),
        Err(e) => ExplainPlan::from_error(&e),
    }
}

fn compiled_json(check: &CompiledCheck, with_teardown: bool) -> Value {
    let mut value = json!({
        "id": check.id(),
        "title": check.class.title,
        "result_kind": check.result_kind,
        "statements": statements_json(&check.statements),
    });
    if with_teardown {
        value["teardown"] = statements_json(&check.teardown());
    }
    value
}

fn statements_json(statements: &[Statement]) -> Value {
    Value::Array(
        statements
            .iter()
            .map(|s| json!({"stage": s.stage, "role": s.role, "sql": s.sql}))
            .collect(),
    )
}

fn rejected_json(rejected: &[RejectedCheck]) -> Value {
    Value::Array(
        rejected
            .iter()
            .map(|r| {
                json!({
                    "origin": r.origin,
                    "code": r.error.code().code(),
                    "stage": r.error.stage(),
                    "message": r.error.message(),
                })
            })
            .collect(),
    )
}
