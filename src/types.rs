//! Shared types: plan items, plans, and digests.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// BLAKE3 digest (32 bytes)
pub type Hash = [u8; 32];

/// One scheduled action as emitted by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Ground action text, e.g. `(move r1 wp1 wp2)`
    pub action: String,
    /// Start time in seconds from plan start
    pub time: f64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl PlanItem {
    pub fn new(action: impl Into<String>, time: f64, duration: f64) -> Self {
        Self {
            action: action.into(),
            time,
            duration,
        }
    }

    /// Start time truncated to whole units, as used for level grouping and node names
    pub fn level_time(&self) -> i64 {
        self.time as i64
    }
}

/// Totally time-ordered plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    items: Vec<PlanItem>,
}

impl Plan {
    pub fn new(items: Vec<PlanItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the plan contract: non-empty action names, finite non-negative
    /// times and durations, and non-decreasing start times.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut previous = 0.0_f64;
        for (index, item) in self.items.iter().enumerate() {
            if item.action.trim().is_empty() {
                return Err(PlanError::EmptyAction { index });
            }
            if !item.time.is_finite() || item.time < 0.0 {
                return Err(PlanError::InvalidTime {
                    index,
                    time: item.time,
                });
            }
            if !item.duration.is_finite() || item.duration < 0.0 {
                return Err(PlanError::InvalidDuration {
                    index,
                    duration: item.duration,
                });
            }
            if item.time < previous {
                return Err(PlanError::NonMonotonic {
                    index,
                    time: item.time,
                    previous,
                });
            }
            previous = item.time;
        }
        Ok(())
    }

    /// Parse a JSON array of `{ "action", "time", "duration" }` objects
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        serde_json::from_str(text).map_err(|e| PlanError::Parse {
            line: e.line(),
            message: e.to_string(),
        })
    }

    /// Parse planner text output.
    ///
    /// Each non-empty line has the form `<time>: (<action>) [<duration>]`.
    /// Lines starting with `;` are comments.
    pub fn parse_planner_output(text: &str) -> Result<Self, PlanError> {
        let mut items = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            items.push(parse_planner_line(line, line_no)?);
        }
        Ok(Self { items })
    }

    /// Load a plan file: `.json` files are parsed as JSON, anything else as
    /// planner text output. The result is validated.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = std::fs::read_to_string(path).map_err(|e| PlanError::Parse {
            line: 0,
            message: format!("Failed to read plan file {:?}: {}", path, e),
        })?;
        let plan = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text)?,
            _ => Self::parse_planner_output(&text)?,
        };
        plan.validate()?;
        Ok(plan)
    }
}

impl FromIterator<PlanItem> for Plan {
    fn from_iter<I: IntoIterator<Item = PlanItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn parse_planner_line(line: &str, line_no: usize) -> Result<PlanItem, PlanError> {
    let parse_err = |message: String| PlanError::Parse {
        line: line_no,
        message,
    };

    let colon = line
        .find(':')
        .ok_or_else(|| parse_err("missing ':' after start time".to_string()))?;
    let time: f64 = line[..colon]
        .trim()
        .parse()
        .map_err(|e| parse_err(format!("invalid start time: {}", e)))?;

    let rest = &line[colon + 1..];
    let open = rest
        .find('(')
        .ok_or_else(|| parse_err("missing '(' around action".to_string()))?;
    let close = rest
        .rfind(')')
        .filter(|close| *close > open)
        .ok_or_else(|| parse_err("missing ')' around action".to_string()))?;
    let action = rest[open..=close].trim().to_string();

    let tail = &rest[close + 1..];
    let duration = match (tail.find('['), tail.find(']')) {
        (Some(l), Some(r)) if r > l => tail[l + 1..r]
            .trim()
            .parse()
            .map_err(|e| parse_err(format!("invalid duration: {}", e)))?,
        _ => return Err(parse_err("missing '[duration]'".to_string())),
    };

    Ok(PlanItem {
        action,
        time,
        duration,
    })
}
