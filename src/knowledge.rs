//! Knowledge source interface
//!
//! The compiler asks a knowledge source for each action's conditions and,
//! for requirements no action produces, whether they already hold.

use crate::condition::Condition;
use crate::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod domain;

pub use domain::{ActionSchema, DomainModel, FunctionValue, StaticKnowledge, WorldStateModel};

/// Conditions of one ground durative action, grouped by when they apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConditions {
    pub at_start_requirements: Vec<Condition>,
    pub over_all_requirements: Vec<Condition>,
    pub at_end_requirements: Vec<Condition>,
    pub at_start_effects: Vec<Condition>,
    pub at_end_effects: Vec<Condition>,
}

impl ActionConditions {
    /// All requirements: at-start, over-all, then at-end
    pub fn requirements(&self) -> impl Iterator<Item = &Condition> {
        self.at_start_requirements
            .iter()
            .chain(&self.over_all_requirements)
            .chain(&self.at_end_requirements)
    }

    /// All effects: at-start, then at-end
    pub fn effects(&self) -> impl Iterator<Item = &Condition> {
        self.at_start_effects.iter().chain(&self.at_end_effects)
    }
}

/// Result of evaluating a condition against world state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub satisfied: bool,
    pub value: Option<f64>,
}

impl Evaluation {
    pub fn truth(satisfied: bool) -> Self {
        Self {
            satisfied,
            value: None,
        }
    }

    pub fn number(value: f64) -> Self {
        Self {
            satisfied: true,
            value: Some(value),
        }
    }

    pub fn unsatisfied() -> Self {
        Self::truth(false)
    }
}

/// Domain and problem knowledge consulted during compilation.
///
/// Calls may block (e.g. a remote query). Implementations shared between
/// threads must be safe for concurrent queries.
pub trait KnowledgeSource {
    /// Conditions of a ground action such as `(move r1 wp1 wp2)`
    fn expand(&self, action: &str) -> Result<ActionConditions, KnowledgeError>;

    /// Evaluate one condition against the current world state
    fn evaluate(&self, condition: &Condition) -> Result<Evaluation, KnowledgeError>;
}

impl<K: KnowledgeSource + ?Sized> KnowledgeSource for &K {
    fn expand(&self, action: &str) -> Result<ActionConditions, KnowledgeError> {
        (**self).expand(action)
    }

    fn evaluate(&self, condition: &Condition) -> Result<Evaluation, KnowledgeError> {
        (**self).evaluate(condition)
    }
}

impl<K: KnowledgeSource + ?Sized> KnowledgeSource for Arc<K> {
    fn expand(&self, action: &str) -> Result<ActionConditions, KnowledgeError> {
        (**self).expand(action)
    }

    fn evaluate(&self, condition: &Condition) -> Result<Evaluation, KnowledgeError> {
        (**self).evaluate(condition)
    }
}
