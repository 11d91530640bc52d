//! Property-based tests for graph and tree structure

use super::support::{knowledge, plan_strategy};
use plantree::tree::TreeBuilder;
use proptest::prelude::*;

/// Predecessor and successor sets mirror each other by key and point forward in time
#[test]
fn test_link_symmetry_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let knowledge = knowledge();

    runner
        .run(&plan_strategy(), |plan| {
            let compilation = TreeBuilder::new(&knowledge).compile(&plan).unwrap();
            let graph = compilation.graph();
            let key = |id: usize| graph.unit(id).node_id();
            let has_key =
                |ids: Vec<usize>, wanted: &str| ids.into_iter().any(|other| key(other) == wanted);
            for id in 0..graph.len() {
                for succ in graph.succ(id) {
                    prop_assert!(has_key(graph.pred(succ), &key(id)));
                    prop_assert!(graph.unit(id).time() < graph.unit(succ).time());
                }
                for pred in graph.pred(id) {
                    prop_assert!(has_key(graph.succ(pred), &key(id)));
                }
            }
            Ok(())
        })
        .unwrap();
}

/// The top-level parallel has one branch per root, and is absent for a single root
#[test]
fn test_root_count_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let knowledge = knowledge();

    runner
        .run(&plan_strategy(), |plan| {
            let compilation = TreeBuilder::new(&knowledge).compile(&plan).unwrap();
            let roots = compilation.graph().roots().len();
            let third = compilation.tree().lines().nth(2).unwrap_or_default().to_string();

            match roots {
                0 => prop_assert_eq!(third, "  </BehaviorTree>"),
                1 => prop_assert!(third.starts_with("    <Sequence name=")),
                n => prop_assert_eq!(
                    third,
                    format!(
                        "    <Parallel success_threshold=\"{}\" failure_threshold=\"1\">",
                        n
                    )
                ),
            }
            Ok(())
        })
        .unwrap();
}

/// Open and close tags balance and indentation tracks nesting depth
#[test]
fn test_tree_is_well_nested_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let knowledge = knowledge();

    runner
        .run(&plan_strategy(), |plan| {
            let tree = TreeBuilder::new(&knowledge).get_tree(&plan).unwrap();
            let mut depth: usize = 0;
            for line in tree.lines() {
                let body = line.trim_start();
                let indent = line.len() - body.len();
                if body.starts_with("</") {
                    prop_assert!(depth > 0);
                    depth -= 1;
                    prop_assert_eq!(indent, depth * 2);
                } else {
                    prop_assert_eq!(indent, depth * 2);
                    if !body.ends_with("/>") {
                        depth += 1;
                    }
                }
            }
            prop_assert_eq!(depth, 0);
            Ok(())
        })
        .unwrap();
}
