//! plantree: Plan-to-Behaviour-Tree Compiler
//!
//! Turns a time-stamped plan of durative actions into a behaviour-tree XML
//! document whose structure mirrors the causal links between actions:
//! an action runs after the actions whose effects it requires.

pub mod cli;
pub mod condition;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod tree;
pub mod types;
pub mod views;
