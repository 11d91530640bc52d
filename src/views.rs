//! Read-only views of a resolved execution graph
//!
//! Serializable snapshots used by the `levels` command and by callers that
//! want to inspect how a tree was derived.

use crate::tree::level::{ExecutionGraph, UnitId};
use serde::{Deserialize, Serialize};

/// One execution level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    pub index: usize,
    pub time: i64,
    pub units: Vec<UnitView>,
}

/// One action unit with its resolved links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub node_id: String,
    pub action: String,
    pub time: i64,
    pub fan_in: usize,
    pub fan_out: usize,
    /// Predecessor node ids, in key order
    pub predecessors: Vec<String>,
    /// Successor node ids, in key order
    pub successors: Vec<String>,
    pub requirements: Vec<RequirementView>,
    pub effects: Vec<EffectView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementView {
    pub condition: String,
    pub satisfied: bool,
    /// Node ids of producing units, one per link
    pub producers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectView {
    pub condition: String,
    /// Node ids of consuming units, one per link
    pub consumers: Vec<String>,
}

/// Snapshot every level of the graph
pub fn level_views(graph: &ExecutionGraph) -> Vec<LevelView> {
    graph
        .levels()
        .iter()
        .enumerate()
        .map(|(index, level)| LevelView {
            index,
            time: level.time,
            units: level.units.iter().map(|id| unit_view(graph, *id)).collect(),
        })
        .collect()
}

fn unit_view(graph: &ExecutionGraph, id: UnitId) -> UnitView {
    let unit = graph.unit(id);
    let node_ids = |ids: Vec<UnitId>| -> Vec<String> {
        ids.into_iter().map(|i| graph.unit(i).node_id()).collect()
    };

    let requirements = unit
        .requirements()
        .iter()
        .map(|req| RequirementView {
            condition: req.condition().to_string(),
            satisfied: req.is_satisfied(),
            producers: req
                .producers()
                .iter()
                .map(|eff| graph.unit(eff.unit).node_id())
                .collect(),
        })
        .collect();

    let effects = unit
        .effects()
        .iter()
        .map(|eff| EffectView {
            condition: eff.condition().to_string(),
            consumers: eff
                .consumers()
                .iter()
                .map(|req| graph.unit(req.unit).node_id())
                .collect(),
        })
        .collect();

    UnitView {
        id,
        node_id: unit.node_id(),
        action: unit.action().to_string(),
        time: unit.time(),
        fan_in: graph.fan_in(id),
        fan_out: graph.fan_out(id),
        predecessors: node_ids(graph.pred(id)),
        successors: node_ids(graph.succ(id)),
        requirements,
        effects,
    }
}
