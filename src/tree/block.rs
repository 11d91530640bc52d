//! Behaviour-tree text fragments
//!
//! Every emitted line is `indent(depth)` followed by one XML element and a
//! newline. Attribute values are written verbatim.

use std::fmt::Write;

/// Two spaces per depth
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

pub(crate) fn line(out: &mut String, depth: usize, text: &str) {
    out.push_str(&indent(depth));
    out.push_str(text);
    out.push('\n');
}

pub(crate) fn open_sequence(out: &mut String, depth: usize, name: &str) {
    line(out, depth, &format!("<Sequence name=\"{}\">", name));
}

pub(crate) fn close_sequence(out: &mut String, depth: usize) {
    line(out, depth, "</Sequence>");
}

/// Single space before `failure_threshold` at every depth, including the
/// successor parallel that older output wrote with two.
pub(crate) fn open_parallel(out: &mut String, depth: usize, success_threshold: usize) {
    line(
        out,
        depth,
        &format!(
            "<Parallel success_threshold=\"{}\" failure_threshold=\"1\">",
            success_threshold
        ),
    );
}

pub(crate) fn close_parallel(out: &mut String, depth: usize) {
    line(out, depth, "</Parallel>");
}

/// `<WaitAction action="..."/>` for one predecessor
pub fn wait_node(out: &mut String, depth: usize, predecessor: &str) {
    line(out, depth, &format!("<WaitAction action=\"{}\"/>", predecessor));
}

/// The fixed lifecycle of one action: wait for start requirements, apply
/// start effects, execute while checking over-all requirements, then check
/// end requirements and apply end effects.
pub fn execution_block(out: &mut String, depth: usize, node_id: &str) {
    let leaf = |out: &mut String, depth: usize, tag: &str| {
        // String writes cannot fail
        let _ = writeln!(out, "{}<{} action=\"{}\"/>", indent(depth), tag, node_id);
    };

    open_sequence(out, depth, node_id);
    leaf(out, depth + 1, "WaitAtStartReq");
    leaf(out, depth + 1, "ApplyAtStartEffect");
    open_parallel(out, depth + 1, 2);
    leaf(out, depth + 2, "CheckOverAllReq");
    leaf(out, depth + 2, "ExecuteAction");
    close_parallel(out, depth + 1);
    leaf(out, depth + 1, "CheckAtEndReq");
    leaf(out, depth + 1, "ApplyAtEndEffect");
    close_sequence(out, depth);
}
