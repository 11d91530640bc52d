//! Error types for the plan-to-execution-tree compiler.

use thiserror::Error;

/// Errors raised by a knowledge source while expanding or evaluating conditions
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Malformed action: {0:?}")]
    MalformedAction(String),

    #[error("Action {action} expects {expected} arguments, got {found}")]
    ArityMismatch {
        action: String,
        expected: usize,
        found: usize,
    },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Failed to load domain: {0}")]
    Load(String),
}

/// Plan validation and parsing errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plan item {index} has an empty action name")]
    EmptyAction { index: usize },

    #[error("Plan item {index} has invalid time {time}")]
    InvalidTime { index: usize, time: f64 },

    #[error("Plan item {index} has invalid duration {duration}")]
    InvalidDuration { index: usize, duration: f64 },

    #[error("Plan item {index} starts at {time}, before the previous item at {previous}")]
    NonMonotonic {
        index: usize,
        time: f64,
        previous: f64,
    },

    #[error("Plan parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Knowledge source failed to expand {action}: {source}")]
    Expansion {
        action: String,
        #[source]
        source: KnowledgeError,
    },

    #[error("Knowledge source failed to evaluate {condition} for {node}: {source}")]
    Evaluation {
        node: String,
        condition: String,
        #[source]
        source: KnowledgeError,
    },

    #[error("{} requirement(s) left unsatisfied: {}", .0.len(), .0.join(", "))]
    UnsatisfiedRequirements(Vec<String>),
}

/// Top-level errors surfaced by configuration, logging and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Invalid plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Knowledge source error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
