//! Execution levels and the action-unit arena
//!
//! A plan is split into levels of actions sharing one (integer) start time.
//! Every scheduled action becomes an `ActionUnit` owned by the
//! `ExecutionGraph` arena; causal links between units are stored as arena
//! indices on both ends.

use crate::condition::{Condition, EffectKey, RequirementKey};
use crate::error::CompileError;
use crate::knowledge::KnowledgeSource;
use crate::types::Plan;
use tracing::{debug, trace};

/// Index of an `ActionUnit` in its `ExecutionGraph`
pub type UnitId = usize;

/// Reference to an effect of another unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectRef {
    pub unit: UnitId,
    pub index: usize,
}

/// Reference to a requirement of another unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequirementRef {
    pub unit: UnitId,
    pub index: usize,
}

/// A precondition of one action
#[derive(Debug, Clone)]
pub struct Requirement {
    condition: Condition,
    key: Option<RequirementKey>,
    pub(crate) satisfied: bool,
    pub(crate) producers: Vec<EffectRef>,
}

impl Requirement {
    pub fn new(condition: Condition) -> Self {
        let key = condition.requirement_key();
        Self {
            condition,
            key,
            satisfied: false,
            producers: Vec::new(),
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Match key; `None` for shapes that never match an effect
    pub fn key(&self) -> Option<&RequirementKey> {
        self.key.as_ref()
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn producers(&self) -> &[EffectRef] {
        &self.producers
    }
}

/// A postcondition of one action
#[derive(Debug, Clone)]
pub struct Effect {
    condition: Condition,
    key: Option<EffectKey>,
    pub(crate) consumers: Vec<RequirementRef>,
}

impl Effect {
    pub fn new(condition: Condition) -> Self {
        let key = condition.effect_key();
        Self {
            condition,
            key,
            consumers: Vec::new(),
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn key(&self) -> Option<&EffectKey> {
        self.key.as_ref()
    }

    pub fn consumers(&self) -> &[RequirementRef] {
        &self.consumers
    }
}

/// One scheduled action instance
#[derive(Debug, Clone)]
pub struct ActionUnit {
    action: String,
    time: i64,
    pub(crate) requirements: Vec<Requirement>,
    pub(crate) effects: Vec<Effect>,
}

impl ActionUnit {
    pub fn new(action: impl Into<String>, time: i64) -> Self {
        Self {
            action: action.into(),
            time,
            requirements: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    /// Identity and ordering key: `<action>:<time>`
    pub fn node_id(&self) -> String {
        format!("{}:{}", self.action, self.time)
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

/// Units sharing one start time, in plan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionLevel {
    pub time: i64,
    pub units: Vec<UnitId>,
}

/// Arena of action units plus their level partition
#[derive(Debug, Clone, Default)]
pub struct ExecutionGraph {
    pub(crate) units: Vec<ActionUnit>,
    pub(crate) levels: Vec<ExecutionLevel>,
}

impl ExecutionGraph {
    pub fn units(&self) -> &[ActionUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &ActionUnit {
        &self.units[id]
    }

    pub fn levels(&self) -> &[ExecutionLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All units in level order, then plan order within a level
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.levels.iter().flat_map(|level| level.units.iter().copied())
    }

    /// Append a unit to the last level, opening a new level when `time`
    /// is past the last level's time.
    pub fn push_unit(&mut self, mut unit: ActionUnit) -> UnitId {
        let opens_level = self
            .levels
            .last()
            .map_or(true, |level| unit.time > level.time);
        if opens_level {
            self.levels.push(ExecutionLevel {
                time: unit.time,
                units: Vec::new(),
            });
        }
        let last = self.levels.len() - 1;
        let level = &mut self.levels[last];
        unit.time = level.time;
        let id = self.units.len();
        level.units.push(id);
        self.units.push(unit);
        id
    }

    /// Connect an effect to a requirement, keeping both sides in sync
    pub(crate) fn link(&mut self, effect: EffectRef, requirement: RequirementRef) {
        let req = &mut self.units[requirement.unit].requirements[requirement.index];
        req.satisfied = true;
        req.producers.push(effect);
        self.units[effect.unit].effects[effect.index]
            .consumers
            .push(requirement);
    }
}

/// Partition a plan into execution levels, expanding each action through the
/// knowledge source.
///
/// Level 0 (time 0) always exists; a new level opens whenever an item's
/// truncated start time exceeds the running maximum. Requirements are the
/// at-start, over-all and at-end conditions in that order; effects are the
/// at-start and at-end conditions.
pub fn build_levels<K>(plan: &Plan, knowledge: &K) -> Result<ExecutionGraph, CompileError>
where
    K: KnowledgeSource + ?Sized,
{
    let mut graph = ExecutionGraph {
        units: Vec::with_capacity(plan.len()),
        levels: vec![ExecutionLevel {
            time: 0,
            units: Vec::new(),
        }],
    };

    for item in plan.iter() {
        let conditions =
            knowledge
                .expand(&item.action)
                .map_err(|source| CompileError::Expansion {
                    action: item.action.clone(),
                    source,
                })?;

        let mut unit = ActionUnit::new(item.action.clone(), item.level_time());
        unit.requirements = conditions
            .requirements()
            .cloned()
            .map(Requirement::new)
            .collect();
        unit.effects = conditions.effects().cloned().map(Effect::new).collect();

        trace!(
            action = %item.action,
            requirements = unit.requirements.len(),
            effects = unit.effects.len(),
            "Materialized action unit"
        );
        graph.push_unit(unit);
    }

    debug!(
        levels = graph.levels.len(),
        units = graph.units.len(),
        "Built execution levels"
    );
    Ok(graph)
}
