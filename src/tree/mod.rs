//! Plan-to-tree compiler
//!
//! Partitions a plan into execution levels, links effects to the
//! requirements they satisfy, and renders the resulting causal graph as a
//! behaviour-tree document.

pub mod block;
pub mod builder;
pub mod graph;
pub mod hasher;
pub mod level;
pub mod resolver;

pub use builder::{Compilation, CompilerOptions, RevisitPolicy, TreeBuilder};
pub use level::{ActionUnit, Effect, ExecutionGraph, ExecutionLevel, Requirement, UnitId};
pub use resolver::{ResolutionSummary, UnsatisfiedRequirement};
