//! Content digests for compiled trees using BLAKE3

use crate::types::{Hash, Plan};
use blake3::Hasher;

/// Digest of a compiled tree document
///
/// digest = hash("behavior_tree" || len || text)
///
/// Identical plans compiled against identical knowledge produce identical
/// documents, so the digest doubles as a cache key and a change detector.
pub fn compute_tree_digest(tree: &str) -> Hash {
    let bytes = tree.as_bytes();
    let mut hasher = Hasher::new();
    hasher.update(b"behavior_tree");
    hasher.update(&(bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
    *hasher.finalize().as_bytes()
}

/// Digest of a plan's scheduled actions
///
/// Each item contributes its action text and the bit patterns of its time
/// and duration, length-prefixed so adjacent items cannot run together.
pub fn compute_plan_digest(plan: &Plan) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(b"plan");
    hasher.update(&(plan.len() as u64).to_be_bytes());
    for item in plan.iter() {
        let action = item.action.as_bytes();
        hasher.update(&(action.len() as u64).to_be_bytes());
        hasher.update(action);
        hasher.update(&item.time.to_bits().to_be_bytes());
        hasher.update(&item.duration.to_bits().to_be_bytes());
    }
    *hasher.finalize().as_bytes()
}

pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}
