//! Logging System
//!
//! Structured logging built on `tracing`. Level, format and destination come
//! from the configuration file, then environment variables, then CLI flags.
//! Logs go to stderr by default because stdout carries compiled trees.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "PLANTREE_LOG";
pub const LOG_FORMAT_ENV: &str = "PLANTREE_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "PLANTREE_LOG_OUTPUT";
pub const LOG_MODULES_ENV: &str = "PLANTREE_LOG_MODULES";

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable to install no subscriber at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file, both (stderr and file)
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path, required when output includes a file
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colored output (text format, terminal destinations only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Check level, format and output without touching the environment
    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid log level '{}' (must be one of {})",
                self.level,
                LEVELS.join(", ")
            ));
        }
        for (module, level) in &self.modules {
            if !LEVELS.contains(&level.as_str()) {
                return Err(format!("Invalid log level '{}' for module '{}'", level, module));
            }
        }
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "Invalid log format '{}' (must be 'json' or 'text')",
                self.format
            ));
        }
        let output = parse_output_destinations(&self.output).map_err(|e| e.to_string())?;
        if output.file && self.file.is_none() {
            return Err(format!("Log output '{}' requires a log file", self.output));
        }
        Ok(())
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (PLANTREE_LOG, PLANTREE_LOG_FORMAT, ...)
/// 2. The given config (CLI flags are already folded into it)
/// 3. Defaults
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    if config.is_some_and(|c| !c.enabled) {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true) && !output.file;
    let writer = build_writer(config, &output)?;

    let base_subscriber = Registry::default().with(filter);
    let installed = if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init()
    };

    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn build_writer(
    config: Option<&LoggingConfig>,
    output: &OutputDestinations,
) -> Result<BoxMakeWriter, ApiError> {
    let file = if output.file {
        let path = config.and_then(|c| c.file.clone()).ok_or_else(|| {
            ApiError::ConfigError("Log output to file requires a log file path".to_string())
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!("Failed to create log directory: {}", e))
            })?;
        }
        let handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                ApiError::ConfigError(format!("Failed to open log file {:?}: {}", path, e))
            })?;
        Some(Arc::new(handle))
    } else {
        None
    };

    let writer = match (file, output.stdout, output.stderr) {
        (Some(file), _, true) => BoxMakeWriter::new(std::io::stderr.and(file)),
        (Some(file), _, false) => BoxMakeWriter::new(file),
        (None, true, _) => BoxMakeWriter::new(std::io::stdout),
        (None, false, _) => BoxMakeWriter::new(std::io::stderr),
    };
    Ok(writer)
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            let directive = format!("{}={}", module, module_level);
            filter = filter.add_directive(
                directive
                    .parse()
                    .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?,
            );
        }
    }

    if let Ok(modules) = std::env::var(LOG_MODULES_ENV) {
        for directive in parse_module_directives(&modules) {
            filter = filter.add_directive(directive.parse().map_err(|e| {
                ApiError::ConfigError(format!("Invalid log directive from env: {}", e))
            })?);
        }
    }

    Ok(filter)
}

/// `a=debug, b=trace` -> `["a=debug", "b=trace"]`; malformed entries are skipped
fn parse_module_directives(directives: &str) -> Vec<String> {
    directives
        .split(',')
        .filter_map(|entry| {
            let (module, level) = entry.split_once('=')?;
            let (module, level) = (module.trim(), level.trim());
            (!module.is_empty() && !level.is_empty()).then(|| format!("{}={}", module, level))
        })
        .collect()
}

/// Determine output format from config or environment
fn determine_format(config: Option<&LoggingConfig>) -> Result<String, ApiError> {
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }

    Ok(format.to_string())
}

/// Output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestinations, ApiError> {
    if let Ok(output) = std::env::var(LOG_OUTPUT_ENV) {
        return parse_output_destinations(&output);
    }

    let output = config.map(|c| c.output.as_str()).unwrap_or("stderr");
    parse_output_destinations(output)
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, ApiError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "both" => (false, true, true),
        _ => {
            return Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}
