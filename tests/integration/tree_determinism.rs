//! Repeated compilations produce identical output

use super::test_utils::{demo_knowledge, demo_plan};
use plantree::tree::{hasher, TreeBuilder};
use plantree::types::Plan;
use std::sync::Arc;

#[test]
fn test_repeated_compilation_is_byte_identical() {
    let knowledge = demo_knowledge();
    let plan = demo_plan();
    let builder = TreeBuilder::new(&knowledge);

    let first = builder.get_tree(&plan).unwrap();
    for _ in 0..5 {
        assert_eq!(builder.get_tree(&plan).unwrap(), first);
    }
}

#[test]
fn test_digest_matches_tree_text() {
    let knowledge = demo_knowledge();
    let compilation = TreeBuilder::new(&knowledge).compile(&demo_plan()).unwrap();

    assert_eq!(
        *compilation.digest(),
        hasher::compute_tree_digest(compilation.tree())
    );
    assert_eq!(
        *compilation.plan_digest(),
        hasher::compute_plan_digest(&demo_plan())
    );
}

#[test]
fn test_json_and_text_plans_compile_identically() {
    let knowledge = demo_knowledge();
    let text_plan = demo_plan();
    let json = serde_json::to_string(&text_plan).unwrap();
    let json_plan = Plan::from_json(&json).unwrap();

    let builder = TreeBuilder::new(&knowledge);
    assert_eq!(
        builder.compile(&text_plan).unwrap().digest(),
        builder.compile(&json_plan).unwrap().digest()
    );
}

#[test]
fn test_concurrent_compilations_agree() {
    let knowledge = Arc::new(demo_knowledge());
    let plan = Arc::new(demo_plan());
    let expected = TreeBuilder::new(knowledge.as_ref()).get_tree(&plan).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let knowledge = Arc::clone(&knowledge);
            let plan = Arc::clone(&plan);
            std::thread::spawn(move || TreeBuilder::new(&knowledge).get_tree(&plan).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
