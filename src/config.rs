//! Configuration System
//!
//! Layered configuration for compiler switches, default inputs and logging.
//! Defaults, the user's global file, workspace files and `PLANTREE_*`
//! environment variables are merged in that order.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::{CompilerOptions, RevisitPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Environment variable selecting `config/<env>.toml`
pub const ENV_NAME_VAR: &str = "PLANTREE_ENV";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantreeConfig {
    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub inputs: InputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiler switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// `skip` or `expand`
    #[serde(default)]
    pub revisit_policy: RevisitPolicy,

    /// Treat unsatisfied requirements as errors
    #[serde(default)]
    pub strict: bool,
}

impl CompilerConfig {
    pub fn options(&self) -> CompilerOptions {
        CompilerOptions {
            revisit: self.revisit_policy,
            strict: self.strict,
        }
    }
}

/// Default input locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Domain model used when no `--domain` is given (`.json` or `.toml`)
    #[serde(default)]
    pub domain_file: Option<PathBuf>,
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), String> {
        let Some(path) = &self.domain_file else {
            return Ok(());
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") | Some("toml") => Ok(()),
            _ => Err(format!(
                "Domain file {} must have a .json or .toml extension",
                path.display()
            )),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Inputs(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Inputs(msg) => write!(f, "Inputs: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PlantreeConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.inputs.validate() {
            errors.push(ValidationError::Inputs(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `validate` folded into a single `ApiError`
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
