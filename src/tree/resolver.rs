//! Dependency resolution
//!
//! Connects effects of earlier levels to matching requirements of later
//! levels, then settles whatever is left against the world state.

use crate::error::CompileError;
use crate::knowledge::KnowledgeSource;
use crate::tree::level::{EffectRef, ExecutionGraph, RequirementRef, UnitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Requirement left open after both resolution passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsatisfiedRequirement {
    /// `<action>:<time>` of the owning unit
    pub node: String,
    pub condition: String,
}

/// Outcome of `resolve_dependencies`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Effect-to-requirement links created by the level sweep
    pub connections: usize,
    /// Requirements found to already hold in the world state
    pub resolved_from_state: usize,
    pub unsatisfied: Vec<UnsatisfiedRequirement>,
}

impl ResolutionSummary {
    pub fn is_fully_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

/// Run the level sweep followed by the world-state fallback.
///
/// Unsatisfied requirements are reported, not treated as errors. A failing
/// knowledge-source evaluation aborts resolution.
pub fn resolve_dependencies<K>(
    graph: &mut ExecutionGraph,
    knowledge: &K,
) -> Result<ResolutionSummary, CompileError>
where
    K: KnowledgeSource + ?Sized,
{
    let connections = sweep_levels(graph);
    let (resolved_from_state, unsatisfied) = resolve_from_state(graph, knowledge)?;

    debug!(
        connections,
        resolved_from_state,
        unsatisfied = unsatisfied.len(),
        "Dependency resolution finished"
    );
    Ok(ResolutionSummary {
        connections,
        resolved_from_state,
        unsatisfied,
    })
}

/// For each level, walk earlier levels from nearest to farthest until every
/// requirement of the level is satisfied or level 0 has been examined.
pub fn sweep_levels(graph: &mut ExecutionGraph) -> usize {
    let mut connections = 0;
    for down in 1..graph.levels.len() {
        let mut up = down;
        while up > 0 && !level_satisfied(graph, down) {
            up -= 1;
            let made = connect_levels(graph, up, down);
            trace!(up, down, made, "Compared levels");
            connections += made;
        }
    }
    connections
}

/// Whether every requirement of every unit in the level is satisfied
pub fn level_satisfied(graph: &ExecutionGraph, level: usize) -> bool {
    graph.levels[level].units.iter().all(|&id| {
        graph.units[id]
            .requirements
            .iter()
            .all(|req| req.satisfied)
    })
}

/// Link every effect of level `up` to every requirement of level `down`
/// that was unsatisfied when the pass began and matches it.
fn connect_levels(graph: &mut ExecutionGraph, up: usize, down: usize) -> usize {
    let mut links = Vec::new();

    for &down_id in &graph.levels[down].units {
        for (req_index, req) in graph.units[down_id].requirements.iter().enumerate() {
            if req.satisfied {
                continue;
            }
            let Some(req_key) = req.key() else {
                continue;
            };
            for &up_id in &graph.levels[up].units {
                for (eff_index, eff) in graph.units[up_id].effects.iter().enumerate() {
                    if eff.key().is_some_and(|eff_key| req_key.is_satisfied_by(eff_key)) {
                        links.push((
                            EffectRef {
                                unit: up_id,
                                index: eff_index,
                            },
                            RequirementRef {
                                unit: down_id,
                                index: req_index,
                            },
                        ));
                    }
                }
            }
        }
    }

    let made = links.len();
    for (effect, requirement) in links {
        graph.link(effect, requirement);
    }
    made
}

fn resolve_from_state<K>(
    graph: &mut ExecutionGraph,
    knowledge: &K,
) -> Result<(usize, Vec<UnsatisfiedRequirement>), CompileError>
where
    K: KnowledgeSource + ?Sized,
{
    let mut resolved = 0;
    let mut unsatisfied = Vec::new();
    let ids: Vec<UnitId> = graph.unit_ids().collect();

    for id in ids {
        let node = graph.units[id].node_id();
        for index in 0..graph.units[id].requirements.len() {
            let req = &graph.units[id].requirements[index];
            if req.satisfied {
                continue;
            }
            let evaluation =
                knowledge
                    .evaluate(req.condition())
                    .map_err(|source| CompileError::Evaluation {
                        node: node.clone(),
                        condition: req.condition().to_string(),
                        source,
                    })?;

            if evaluation.satisfied {
                resolved += 1;
            } else {
                let condition = req.condition().to_string();
                warn!(node = %node, condition = %condition, "Requirement left unsatisfied");
                unsatisfied.push(UnsatisfiedRequirement {
                    node: node.clone(),
                    condition,
                });
            }
            graph.units[id].requirements[index].satisfied = evaluation.satisfied;
        }
    }

    Ok((resolved, unsatisfied))
}
