//! Graph accessors over resolved causal links
//!
//! Predecessor and successor sets are recomputed from the links on every
//! call. The `<action>:<time>` string is a unit's identity: sets hold one
//! unit per key (the lowest arena index) and are ordered by plain string
//! comparison, so `a:10` sorts before `a:2`.

use crate::tree::level::{ExecutionGraph, UnitId};
use std::collections::BTreeMap;

impl ExecutionGraph {
    /// Distinct units producing any of `id`'s requirements
    pub fn pred(&self, id: UnitId) -> Vec<UnitId> {
        self.ordered(
            self.units[id]
                .requirements
                .iter()
                .flat_map(|req| req.producers.iter().map(|eff| eff.unit)),
        )
    }

    /// Distinct units consuming any of `id`'s effects
    pub fn succ(&self, id: UnitId) -> Vec<UnitId> {
        self.ordered(
            self.units[id]
                .effects
                .iter()
                .flat_map(|eff| eff.consumers.iter().map(|req| req.unit)),
        )
    }

    pub fn fan_in(&self, id: UnitId) -> usize {
        self.pred(id).len()
    }

    pub fn fan_out(&self, id: UnitId) -> usize {
        self.succ(id).len()
    }

    /// Units without predecessors, in level then plan order
    pub fn roots(&self) -> Vec<UnitId> {
        self.unit_ids().filter(|id| self.fan_in(*id) == 0).collect()
    }

    fn ordered(&self, ids: impl Iterator<Item = UnitId>) -> Vec<UnitId> {
        let mut by_key: BTreeMap<String, UnitId> = BTreeMap::new();
        for id in ids {
            by_key
                .entry(self.units[id].node_id())
                .and_modify(|kept| *kept = (*kept).min(id))
                .or_insert(id);
        }
        by_key.into_values().collect()
    }
}
