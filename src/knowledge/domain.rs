//! Static, in-memory knowledge source
//!
//! Holds action schemas and a world state loaded from a domain file (JSON or
//! TOML) or assembled in code. Ground actions are expanded by substituting
//! schema parameters; conditions are evaluated against the world state.

use crate::condition::{Atom, Condition, ExprOp, ModifierOp};
use crate::error::KnowledgeError;
use crate::knowledge::{ActionConditions, Evaluation, KnowledgeSource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, trace};

/// Durative action schema with `?`-prefixed parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_start_requirements: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_all_requirements: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_end_requirements: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_start_effects: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_end_effects: Option<Condition>,
}

impl ActionSchema {
    pub fn new(name: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn instantiate(&self, bindings: &HashMap<String, String>) -> ActionConditions {
        let group = |root: &Option<Condition>| {
            root.as_ref()
                .map(|c| c.ground(bindings).into_conjuncts())
                .unwrap_or_default()
        };
        ActionConditions {
            at_start_requirements: group(&self.at_start_requirements),
            over_all_requirements: group(&self.over_all_requirements),
            at_end_requirements: group(&self.at_end_requirements),
            at_start_effects: group(&self.at_start_effects),
            at_end_effects: group(&self.at_end_effects),
        }
    }
}

/// Numeric function value in the initial state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    pub function: Atom,
    pub value: f64,
}

/// Serialized world state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStateModel {
    #[serde(default)]
    pub predicates: Vec<Atom>,
    #[serde(default)]
    pub functions: Vec<FunctionValue>,
}

/// Domain file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainModel {
    #[serde(default)]
    pub actions: Vec<ActionSchema>,
    #[serde(default)]
    pub state: WorldStateModel,
}

impl DomainModel {
    /// Load a domain file; the format follows the extension (`.json` or `.toml`)
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            KnowledgeError::Load(format!("Failed to read domain file {:?}: {}", path, e))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            other => Err(KnowledgeError::Load(format!(
                "Unsupported domain file extension {:?} (expected json or toml)",
                other
            ))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, KnowledgeError> {
        serde_json::from_str(text).map_err(|e| KnowledgeError::Load(e.to_string()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, KnowledgeError> {
        toml::from_str(text).map_err(|e| KnowledgeError::Load(e.to_string()))
    }

    /// Report every structural problem in the schemas
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for schema in &self.actions {
            if schema.name.trim().is_empty() {
                errors.push("Action with empty name".to_string());
                continue;
            }
            if !names.insert(schema.name.as_str()) {
                errors.push(format!("Duplicate action '{}'", schema.name));
            }
            let mut params = HashSet::new();
            for param in &schema.parameters {
                if !param.starts_with('?') {
                    errors.push(format!(
                        "Action '{}': parameter '{}' must start with '?'",
                        schema.name, param
                    ));
                }
                if !params.insert(param.as_str()) {
                    errors.push(format!(
                        "Action '{}': duplicate parameter '{}'",
                        schema.name, param
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default)]
struct WorldState {
    predicates: BTreeSet<Atom>,
    functions: BTreeMap<Atom, f64>,
}

/// Knowledge source backed by in-memory schemas and world state.
///
/// The world state sits behind a read/write lock, so a single instance can
/// serve concurrent compilations and still be updated between them.
#[derive(Debug, Default)]
pub struct StaticKnowledge {
    schemas: BTreeMap<String, ActionSchema>,
    state: RwLock<WorldState>,
}

impl StaticKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_model(model: DomainModel) -> Self {
        let mut knowledge = Self::new();
        for schema in model.actions {
            knowledge.add_action(schema);
        }
        {
            let mut state = knowledge.state.write();
            state.predicates.extend(model.state.predicates);
            for fv in model.state.functions {
                state.functions.insert(fv.function, fv.value);
            }
        }
        knowledge
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let model = DomainModel::load(path)?;
        debug!(
            path = %path.display(),
            actions = model.actions.len(),
            predicates = model.state.predicates.len(),
            functions = model.state.functions.len(),
            "Loaded domain"
        );
        Ok(Self::from_model(model))
    }

    pub fn with_action(mut self, schema: ActionSchema) -> Self {
        self.add_action(schema);
        self
    }

    pub fn with_predicate(self, atom: Atom) -> Self {
        self.set_predicate(atom, true);
        self
    }

    pub fn with_function(self, atom: Atom, value: f64) -> Self {
        self.set_function(atom, value);
        self
    }

    /// Register a schema, replacing any schema with the same name
    pub fn add_action(&mut self, schema: ActionSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn set_predicate(&self, atom: Atom, holds: bool) {
        let mut state = self.state.write();
        if holds {
            state.predicates.insert(atom);
        } else {
            state.predicates.remove(&atom);
        }
    }

    pub fn set_function(&self, atom: Atom, value: f64) {
        self.state.write().functions.insert(atom, value);
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl KnowledgeSource for StaticKnowledge {
    fn expand(&self, action: &str) -> Result<ActionConditions, KnowledgeError> {
        let ground = Atom::parse(action)
            .ok_or_else(|| KnowledgeError::MalformedAction(action.to_string()))?;
        let schema = self
            .schemas
            .get(&ground.name)
            .ok_or_else(|| KnowledgeError::UnknownAction(ground.name.clone()))?;

        if schema.parameters.len() != ground.params.len() {
            return Err(KnowledgeError::ArityMismatch {
                action: ground.name,
                expected: schema.parameters.len(),
                found: ground.params.len(),
            });
        }

        let bindings: HashMap<String, String> = schema
            .parameters
            .iter()
            .cloned()
            .zip(ground.params.iter().cloned())
            .collect();

        trace!(action = %action, "Expanded action");
        Ok(schema.instantiate(&bindings))
    }

    fn evaluate(&self, condition: &Condition) -> Result<Evaluation, KnowledgeError> {
        let state = self.state.read();
        evaluate_in(&state, condition)
    }
}

fn evaluate_in(state: &WorldState, condition: &Condition) -> Result<Evaluation, KnowledgeError> {
    match condition {
        Condition::Predicate(atom) => Ok(Evaluation::truth(state.predicates.contains(atom))),
        Condition::Function(atom) => Ok(state
            .functions
            .get(atom)
            .map(|value| Evaluation::number(*value))
            .unwrap_or_else(Evaluation::unsatisfied)),
        Condition::Number(value) => Ok(Evaluation::number(*value)),
        Condition::And(ops) => {
            for op in ops {
                if !evaluate_in(state, op)?.satisfied {
                    return Ok(Evaluation::unsatisfied());
                }
            }
            Ok(Evaluation::truth(true))
        }
        Condition::Or(ops) => {
            for op in ops {
                if evaluate_in(state, op)?.satisfied {
                    return Ok(Evaluation::truth(true));
                }
            }
            Ok(Evaluation::unsatisfied())
        }
        Condition::Not(inner) => Ok(Evaluation::truth(!evaluate_in(state, inner)?.satisfied)),
        Condition::Expression { op, ops } => {
            let (lhs, rhs) = binary_operands(ops, op.symbol())?;
            let (Some(a), Some(b)) = (numeric(state, lhs)?, numeric(state, rhs)?) else {
                return Ok(Evaluation::unsatisfied());
            };
            Ok(apply_expression(*op, a, b))
        }
        Condition::FunctionModifier { op, ops } => {
            let (target, amount) = binary_operands(ops, op.keyword())?;
            if !matches!(target, Condition::Function(_)) {
                return Err(KnowledgeError::Evaluation(format!(
                    "{} target must be a function, got {}",
                    op.keyword(),
                    target
                )));
            }
            let (Some(current), Some(amount)) = (numeric(state, target)?, numeric(state, amount)?)
            else {
                return Ok(Evaluation::unsatisfied());
            };
            Ok(Evaluation::number(apply_modifier(*op, current, amount)))
        }
    }
}

fn binary_operands<'a>(
    ops: &'a [Condition],
    head: &str,
) -> Result<(&'a Condition, &'a Condition), KnowledgeError> {
    match ops {
        [lhs, rhs] => Ok((lhs, rhs)),
        _ => Err(KnowledgeError::Evaluation(format!(
            "({} ...) expects 2 operands, got {}",
            head,
            ops.len()
        ))),
    }
}

fn numeric(state: &WorldState, condition: &Condition) -> Result<Option<f64>, KnowledgeError> {
    let evaluation = evaluate_in(state, condition)?;
    Ok(if evaluation.satisfied {
        evaluation.value
    } else {
        None
    })
}

fn apply_expression(op: ExprOp, a: f64, b: f64) -> Evaluation {
    match op {
        ExprOp::Ge => Evaluation::truth(a >= b),
        ExprOp::Gt => Evaluation::truth(a > b),
        ExprOp::Le => Evaluation::truth(a <= b),
        ExprOp::Lt => Evaluation::truth(a < b),
        ExprOp::Eq => Evaluation::truth(a == b),
        ExprOp::Add => Evaluation::number(a + b),
        ExprOp::Sub => Evaluation::number(a - b),
        ExprOp::Mul => Evaluation::number(a * b),
        ExprOp::Div if b == 0.0 => Evaluation::unsatisfied(),
        ExprOp::Div => Evaluation::number(a / b),
    }
}

fn apply_modifier(op: ModifierOp, current: f64, amount: f64) -> f64 {
    match op {
        ModifierOp::Assign => amount,
        ModifierOp::Increase => current + amount,
        ModifierOp::Decrease => current - amount,
        ModifierOp::ScaleUp => current * amount,
        ModifierOp::ScaleDown => current / amount,
    }
}
