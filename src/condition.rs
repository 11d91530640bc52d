//! Symbolic condition model
//!
//! Requirements and effects are condition trees as produced by the domain's
//! action definitions. The compiler only needs to classify a node by kind and
//! extract its identifying name; everything else is carried along for
//! evaluation and diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A named term with arguments: `(robot_at r1 wp1)` or `(battery r1)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Atom {
    pub name: String,
    pub params: Vec<String>,
}

impl Atom {
    pub fn new<S: Into<String>>(name: S, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Parse `(name arg ...)` or `name arg ...`. Nested terms are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let inner = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => return None,
        };
        if inner.contains('(') || inner.contains(')') {
            return None;
        }
        let mut tokens = inner.split_whitespace();
        let name = tokens.next()?.to_string();
        Some(Self {
            name,
            params: tokens.map(str::to_string).collect(),
        })
    }

    /// Replace bound parameters (e.g. `?r` -> `r1`)
    pub fn ground(&self, bindings: &HashMap<String, String>) -> Self {
        Self {
            name: self.name.clone(),
            params: self
                .params
                .iter()
                .map(|p| bindings.get(p).cloned().unwrap_or_else(|| p.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        write!(f, ")")
    }
}

impl TryFrom<String> for Atom {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Atom::parse(&value).ok_or_else(|| format!("invalid atom: {:?}", value))
    }
}

impl From<Atom> for String {
    fn from(atom: Atom) -> Self {
        atom.to_string()
    }
}

/// Comparison and arithmetic operators of numeric expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprOp {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Add,
    Sub,
    Mul,
    Div,
}

impl ExprOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ExprOp::Ge => ">=",
            ExprOp::Gt => ">",
            ExprOp::Le => "<=",
            ExprOp::Lt => "<",
            ExprOp::Eq => "=",
            ExprOp::Add => "+",
            ExprOp::Sub => "-",
            ExprOp::Mul => "*",
            ExprOp::Div => "/",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            ExprOp::Ge | ExprOp::Gt | ExprOp::Le | ExprOp::Lt | ExprOp::Eq
        )
    }
}

/// Numeric function modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierOp {
    Assign,
    Increase,
    Decrease,
    ScaleUp,
    ScaleDown,
}

impl ModifierOp {
    pub fn keyword(self) -> &'static str {
        match self {
            ModifierOp::Assign => "assign",
            ModifierOp::Increase => "increase",
            ModifierOp::Decrease => "decrease",
            ModifierOp::ScaleUp => "scale-up",
            ModifierOp::ScaleDown => "scale-down",
        }
    }
}

/// Condition tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Predicate(Atom),
    Function(Atom),
    Number(f64),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Expression { op: ExprOp, ops: Vec<Condition> },
    FunctionModifier { op: ModifierOp, ops: Vec<Condition> },
}

impl Condition {
    pub fn predicate(name: &str, params: &[&str]) -> Self {
        Condition::Predicate(Atom::new(name, params))
    }

    pub fn function(name: &str, params: &[&str]) -> Self {
        Condition::Function(Atom::new(name, params))
    }

    pub fn negate(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    pub fn compare(op: ExprOp, lhs: Condition, rhs: Condition) -> Self {
        Condition::Expression {
            op,
            ops: vec![lhs, rhs],
        }
    }

    pub fn modify(op: ModifierOp, target: Condition, amount: Condition) -> Self {
        Condition::FunctionModifier {
            op,
            ops: vec![target, amount],
        }
    }

    /// Match key when this node is used as a requirement
    pub fn requirement_key(&self) -> Option<RequirementKey> {
        match self {
            Condition::Predicate(atom) => Some(RequirementKey::PredicateCheck(atom.name.clone())),
            Condition::Expression { ops, .. } => match ops.first() {
                Some(Condition::Function(atom)) => {
                    Some(RequirementKey::NumericComparison(atom.name.clone()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Match key when this node is used as an effect
    pub fn effect_key(&self) -> Option<EffectKey> {
        match self {
            Condition::Predicate(atom) => Some(EffectKey::PredicateCheck(atom.name.clone())),
            Condition::FunctionModifier { ops, .. } => match ops.first() {
                Some(Condition::Function(atom)) => {
                    Some(EffectKey::FunctionModifier(atom.name.clone()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Substitute action parameters throughout the tree
    pub fn ground(&self, bindings: &HashMap<String, String>) -> Self {
        let ground_all =
            |ops: &[Condition]| ops.iter().map(|c| c.ground(bindings)).collect::<Vec<_>>();
        match self {
            Condition::Predicate(atom) => Condition::Predicate(atom.ground(bindings)),
            Condition::Function(atom) => Condition::Function(atom.ground(bindings)),
            Condition::Number(value) => Condition::Number(*value),
            Condition::And(ops) => Condition::And(ground_all(ops)),
            Condition::Or(ops) => Condition::Or(ground_all(ops)),
            Condition::Not(inner) => Condition::Not(Box::new(inner.ground(bindings))),
            Condition::Expression { op, ops } => Condition::Expression {
                op: *op,
                ops: ground_all(ops),
            },
            Condition::FunctionModifier { op, ops } => Condition::FunctionModifier {
                op: *op,
                ops: ground_all(ops),
            },
        }
    }

    /// Flatten a condition group root into its conjuncts.
    ///
    /// An `and` root contributes its operands; any other root is its own
    /// single conjunct.
    pub fn into_conjuncts(self) -> Vec<Condition> {
        match self {
            Condition::And(ops) => ops,
            other => vec![other],
        }
    }
}

fn write_compound(f: &mut fmt::Formatter<'_>, head: &str, ops: &[Condition]) -> fmt::Result {
    write!(f, "({}", head)?;
    for op in ops {
        write!(f, " {}", op)?;
    }
    write!(f, ")")
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Predicate(atom) | Condition::Function(atom) => write!(f, "{}", atom),
            Condition::Number(value) => write!(f, "{}", value),
            Condition::And(ops) => write_compound(f, "and", ops),
            Condition::Or(ops) => write_compound(f, "or", ops),
            Condition::Not(inner) => write!(f, "(not {})", inner),
            Condition::Expression { op, ops } => write_compound(f, op.symbol(), ops),
            Condition::FunctionModifier { op, ops } => write_compound(f, op.keyword(), ops),
        }
    }
}

/// Identifying key of a matchable requirement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequirementKey {
    PredicateCheck(String),
    NumericComparison(String),
}

/// Identifying key of a matchable effect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectKey {
    PredicateCheck(String),
    FunctionModifier(String),
}

impl RequirementKey {
    /// Predicate checks match predicate effects and numeric comparisons match
    /// function modifiers, in both cases on the same name.
    pub fn is_satisfied_by(&self, effect: &EffectKey) -> bool {
        match (self, effect) {
            (RequirementKey::PredicateCheck(req), EffectKey::PredicateCheck(eff)) => req == eff,
            (RequirementKey::NumericComparison(req), EffectKey::FunctionModifier(eff)) => {
                req == eff
            }
            (RequirementKey::PredicateCheck(_), EffectKey::FunctionModifier(_))
            | (RequirementKey::NumericComparison(_), EffectKey::PredicateCheck(_)) => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RequirementKey::PredicateCheck(name) | RequirementKey::NumericComparison(name) => name,
        }
    }
}

impl EffectKey {
    pub fn name(&self) -> &str {
        match self {
            EffectKey::PredicateCheck(name) | EffectKey::FunctionModifier(name) => name,
        }
    }
}
