//! End-to-end compilation scenarios

use super::test_utils::{
    check_tree_structure, demo_knowledge, demo_plan, knowledge_from_json, plan,
};
use plantree::tree::{CompilerOptions, RevisitPolicy, TreeBuilder};
use plantree::types::Plan;

const HEADER: &str = "<root main_tree_to_execute=\"MainTree\">\n  <BehaviorTree ID=\"MainTree\">\n";
const FOOTER: &str = "  </BehaviorTree>\n</root>\n";

const LINKED_DOMAIN: &str = r#"{
  "actions": [
    { "name": "open", "parameters": ["?d"],
      "at_end_effects": { "predicate": "(door_open ?d)" } },
    { "name": "light", "parameters": ["?l"],
      "at_end_effects": { "predicate": "(lit ?l)" } },
    { "name": "enter", "parameters": ["?d"],
      "at_start_requirements": { "predicate": "(door_open ?d)" } },
    { "name": "inspect", "parameters": ["?d", "?l"],
      "at_start_requirements": { "and": [
        { "predicate": "(door_open ?d)" },
        { "predicate": "(lit ?l)" }
      ] } },
    { "name": "wave", "parameters": [] },
    { "name": "unlock", "parameters": ["?d"],
      "at_start_requirements": { "predicate": "(has_key ?d)" } }
  ],
  "state": { "predicates": ["(has_key front)"] }
}"#;

fn tree_for(items: &[(&str, f64)]) -> String {
    let knowledge = knowledge_from_json(LINKED_DOMAIN);
    TreeBuilder::new(&knowledge).get_tree(&plan(items)).unwrap()
}

#[test]
fn test_single_unconditioned_action() {
    let tree = tree_for(&[("(wave)", 0.0)]);
    let lines: Vec<&str> = tree.lines().collect();

    assert_eq!(lines.len(), 14);
    assert_eq!(lines[2], "    <Sequence name=\"(wave):0\">");
    assert_eq!(lines[3], "      <WaitAtStartReq action=\"(wave):0\"/>");
    assert_eq!(lines[6], "        <CheckOverAllReq action=\"(wave):0\"/>");
    assert_eq!(lines[11], "    </Sequence>");
    assert!(!tree.contains("<Parallel success_threshold=\"1\""));
    check_tree_structure(&tree).unwrap();
}

#[test]
fn test_causal_chain_nests_consumer() {
    let tree = tree_for(&[("(open front)", 0.0), ("(enter front)", 1.0)]);

    assert!(tree.starts_with(&format!("{}    <Sequence name=\"(open front):0\">\n", HEADER)));
    // Consumer block sits one level inside the producer's sequence
    assert!(tree.contains("      <Sequence name=\"(enter front):1\">\n"));
    assert!(!tree.contains("WaitAction"));
    assert!(!tree.contains("<Parallel success_threshold=\"2\" failure_threshold=\"1\">\n    <Sequence"));
    check_tree_structure(&tree).unwrap();
}

#[test]
fn test_independent_actions_share_top_level_parallel() {
    let tree = tree_for(&[("(wave)", 0.0), ("(open back)", 0.0)]);
    let lines: Vec<&str> = tree.lines().collect();

    assert_eq!(
        lines[2],
        "    <Parallel success_threshold=\"2\" failure_threshold=\"1\">"
    );
    assert_eq!(lines[3], "      <Sequence name=\"(wave):0\">");
    assert_eq!(lines[lines.len() - 3], "    </Parallel>");
    check_tree_structure(&tree).unwrap();
}

#[test]
fn test_requirement_held_in_state_is_not_a_dependency() {
    let knowledge = knowledge_from_json(LINKED_DOMAIN);
    let compilation = TreeBuilder::new(&knowledge)
        .compile(&plan(&[("(wave)", 0.0), ("(unlock front)", 2.0)]))
        .unwrap();

    let graph = compilation.graph();
    let unlock = graph.levels()[1].units[0];
    assert_eq!(graph.fan_in(unlock), 0);
    assert!(graph.unit(unlock).requirements()[0].is_satisfied());
    assert!(graph.unit(unlock).requirements()[0].producers().is_empty());
    assert!(compilation.summary().is_fully_satisfied());
    // Both are roots
    assert!(compilation
        .tree()
        .contains("    <Parallel success_threshold=\"2\" failure_threshold=\"1\">\n"));
}

#[test]
fn test_join_waits_on_each_predecessor() {
    let tree = tree_for(&[
        ("(open front)", 0.0),
        ("(light hall)", 0.0),
        ("(inspect front hall)", 1.0),
    ]);

    let join_start = tree
        .find("<Sequence name=\"(inspect front hall):1\">")
        .unwrap();
    let join = &tree[join_start..];
    let waits: Vec<&str> = join
        .lines()
        .skip(1)
        .take_while(|line| line.contains("WaitAction"))
        .map(str::trim)
        .collect();
    assert_eq!(
        waits,
        vec![
            "<WaitAction action=\"(light hall):0\"/>",
            "<WaitAction action=\"(open front):0\"/>",
        ]
    );
    check_tree_structure(&tree).unwrap();
}

#[test]
fn test_empty_plan() {
    let tree = tree_for(&[]);
    assert_eq!(tree, format!("{}{}", HEADER, FOOTER));

    let knowledge = knowledge_from_json(LINKED_DOMAIN);
    let compilation = TreeBuilder::new(&knowledge).compile(&Plan::default()).unwrap();
    assert_eq!(compilation.levels().len(), 1);
}

#[test]
fn test_late_start_times_truncate_to_levels() {
    let tree = tree_for(&[("(open front)", 3.7), ("(enter front)", 4.2)]);
    assert!(tree.contains("<Sequence name=\"(open front):3\">"));
    assert!(tree.contains("<ExecuteAction action=\"(enter front):4\"/>"));
}

#[test]
fn test_factory_demo() {
    let knowledge = demo_knowledge();
    let compilation = TreeBuilder::new(&knowledge).compile(&demo_plan()).unwrap();
    let tree = compilation.tree();

    let summary = compilation.summary();
    assert_eq!(summary.connections, 8);
    assert_eq!(summary.resolved_from_state, 9);
    assert!(summary.is_fully_satisfied());

    // Two robots start independently
    assert_eq!(
        tree.lines().nth(2),
        Some("    <Parallel success_threshold=\"2\" failure_threshold=\"1\">")
    );
    // Each root walk reaches the final placement once
    assert_eq!(
        tree.matches("<ExecuteAction action=\"(place r1 box bench):12\"/>")
            .count(),
        2
    );
    assert!(tree.contains(
        "<WaitAction action=\"(charge r2 dock):0\"/>\n"
    ));
    check_tree_structure(tree).unwrap();
}

#[test]
fn test_factory_demo_with_expand_policy() {
    let knowledge = demo_knowledge();
    let options = CompilerOptions {
        revisit: RevisitPolicy::Expand,
        ..CompilerOptions::default()
    };
    let tree = TreeBuilder::new(&knowledge)
        .with_options(options)
        .get_tree(&demo_plan())
        .unwrap();

    assert_eq!(
        tree.matches("<ExecuteAction action=\"(place r1 box bench):12\"/>")
            .count(),
        3
    );
    check_tree_structure(&tree).unwrap();
}

#[test]
fn test_unknown_action_fails_without_output() {
    let knowledge = knowledge_from_json(LINKED_DOMAIN);
    let err = TreeBuilder::new(&knowledge)
        .get_tree(&plan(&[("(wave)", 0.0), ("(fly away)", 1.0)]))
        .unwrap_err();
    assert!(err.to_string().contains("(fly away)"));
}
