//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, CompileError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Compile(CompileError::UnsatisfiedRequirements(list)) => {
            let mut out = format!("error: {} requirement(s) left unsatisfied", list.len());
            for entry in list {
                out.push_str(&format!("\n  {}", entry));
            }
            out
        }
        other => format!("error: {}", other),
    }
}
