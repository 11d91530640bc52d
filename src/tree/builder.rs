//! Tree builder for compiling plans into behaviour trees

use crate::error::CompileError;
use crate::knowledge::KnowledgeSource;
use crate::tree::block::{self, close_parallel, close_sequence, open_parallel, open_sequence};
use crate::tree::hasher;
use crate::tree::level::{build_levels, ExecutionGraph, UnitId};
use crate::tree::resolver::{resolve_dependencies, ResolutionSummary};
use crate::types::{Hash, Plan};
use crate::views::{level_views, LevelView};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What to do when a walk reaches a node it already emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisitPolicy {
    /// Emit nothing for the node the second time
    #[default]
    Skip,
    /// Emit the node and its subtree again. Output size is not capped and
    /// grows exponentially with the number of stacked diamonds.
    Expand,
}

impl fmt::Display for RevisitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisitPolicy::Skip => write!(f, "skip"),
            RevisitPolicy::Expand => write!(f, "expand"),
        }
    }
}

impl FromStr for RevisitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(RevisitPolicy::Skip),
            "expand" => Ok(RevisitPolicy::Expand),
            other => Err(format!(
                "unknown revisit policy '{}' (expected skip or expand)",
                other
            )),
        }
    }
}

/// Compiler switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub revisit: RevisitPolicy,
    /// Fail instead of warning when requirements stay unsatisfied
    pub strict: bool,
}

/// Result of a successful compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    graph: ExecutionGraph,
    summary: ResolutionSummary,
    tree: String,
    digest: Hash,
    plan_digest: Hash,
}

impl Compilation {
    pub fn tree(&self) -> &str {
        &self.tree
    }

    pub fn into_tree(self) -> String {
        self.tree
    }

    pub fn graph(&self) -> &ExecutionGraph {
        &self.graph
    }

    pub fn summary(&self) -> &ResolutionSummary {
        &self.summary
    }

    /// BLAKE3 digest of the tree text
    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    pub fn digest_hex(&self) -> String {
        hasher::to_hex(&self.digest)
    }

    /// BLAKE3 digest of the input plan
    pub fn plan_digest(&self) -> &Hash {
        &self.plan_digest
    }

    /// Read-only structured view of levels, units and links
    pub fn levels(&self) -> Vec<LevelView> {
        level_views(&self.graph)
    }
}

/// Compiles plans against a knowledge source
pub struct TreeBuilder<'k, K: ?Sized> {
    knowledge: &'k K,
    options: CompilerOptions,
}

impl<'k, K> TreeBuilder<'k, K>
where
    K: KnowledgeSource + ?Sized,
{
    pub fn new(knowledge: &'k K) -> Self {
        Self {
            knowledge,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a plan and return only the tree document
    pub fn get_tree(&self, plan: &Plan) -> Result<String, CompileError> {
        self.compile(plan).map(Compilation::into_tree)
    }

    /// Build levels, resolve dependencies and synthesize the tree.
    ///
    /// No partial output is produced on failure.
    #[instrument(skip(self, plan), fields(actions = plan.len(), revisit = %self.options.revisit))]
    pub fn compile(&self, plan: &Plan) -> Result<Compilation, CompileError> {
        let start = Instant::now();
        info!("Starting tree compilation");

        let mut graph = build_levels(plan, self.knowledge)?;
        let summary = resolve_dependencies(&mut graph, self.knowledge)?;

        if self.options.strict && !summary.is_fully_satisfied() {
            let unsatisfied = summary
                .unsatisfied
                .iter()
                .map(|u| format!("{} {}", u.node, u.condition))
                .collect();
            return Err(CompileError::UnsatisfiedRequirements(unsatisfied));
        }

        let tree = synthesize(&graph, self.options.revisit);
        let digest = hasher::compute_tree_digest(&tree);
        let plan_digest = hasher::compute_plan_digest(plan);

        let duration = start.elapsed();
        info!(
            levels = graph.levels().len(),
            units = graph.len(),
            connections = summary.connections,
            unsatisfied = summary.unsatisfied.len(),
            duration_ms = duration.as_millis(),
            "Tree compilation complete"
        );

        Ok(Compilation {
            graph,
            summary,
            tree,
            digest,
            plan_digest,
        })
    }
}

/// Render the resolved graph as a behaviour-tree document
pub fn synthesize(graph: &ExecutionGraph, revisit: RevisitPolicy) -> String {
    let mut out = String::new();
    block::line(&mut out, 0, "<root main_tree_to_execute=\"MainTree\">");
    block::line(&mut out, 1, "<BehaviorTree ID=\"MainTree\">");

    let roots = graph.roots();
    debug!(roots = roots.len(), "Synthesizing tree");

    let mut synth = Synthesizer {
        graph,
        revisit,
        out: &mut out,
    };
    if roots.len() > 1 {
        open_parallel(synth.out, 2, roots.len());
        for root in roots {
            synth.emit(root, 3, &mut HashSet::new());
        }
        close_parallel(synth.out, 2);
    } else {
        for root in roots {
            synth.emit(root, 2, &mut HashSet::new());
        }
    }

    block::line(&mut out, 1, "</BehaviorTree>");
    block::line(&mut out, 0, "</root>");
    out
}

struct Synthesizer<'g, 'o> {
    graph: &'g ExecutionGraph,
    revisit: RevisitPolicy,
    out: &'o mut String,
}

impl Synthesizer<'_, '_> {
    fn emit(&mut self, node: UnitId, depth: usize, visited: &mut HashSet<String>) {
        let node_id = self.graph.unit(node).node_id();
        if !visited.insert(node_id.clone()) && self.revisit == RevisitPolicy::Skip {
            warn!(node = %node_id, "Skipping already expanded node");
            return;
        }

        let preds = self.graph.pred(node);
        let succs = self.graph.succ(node);

        if succs.is_empty() && preds.len() <= 1 {
            block::execution_block(self.out, depth, &node_id);
            return;
        }

        open_sequence(self.out, depth, &node_id);
        if preds.len() > 1 {
            for pred in &preds {
                block::wait_node(self.out, depth + 1, &self.graph.unit(*pred).node_id());
            }
        }
        block::execution_block(self.out, depth + 1, &node_id);

        match succs.as_slice() {
            [] => {}
            [next] => self.emit(*next, depth + 1, visited),
            many => {
                open_parallel(self.out, depth + 1, many.len());
                for next in many {
                    self.emit(*next, depth + 2, visited);
                }
                close_parallel(self.out, depth + 1);
            }
        }
        close_sequence(self.out, depth);
    }
}
