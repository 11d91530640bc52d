//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::tree::{Compilation, ResolutionSummary};
use crate::views::LevelView;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

/// Format a section heading with bold/underline.
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Confirmation printed after `compile --output`
pub fn format_compile_summary(path: &Path, compilation: &Compilation, digest: bool) -> String {
    let summary = compilation.summary();
    let mut out = format!(
        "Wrote {} ({} levels, {} actions, {} links)",
        path.display(),
        compilation.graph().levels().len(),
        compilation.graph().len(),
        summary.connections
    );
    if !summary.unsatisfied.is_empty() {
        out.push_str(&format!(
            "\n{}",
            format!("{} requirement(s) unsatisfied", summary.unsatisfied.len()).yellow()
        ));
    }
    if digest {
        out.push_str(&format!("\ndigest: {}", compilation.digest_hex()));
    }
    out
}

fn cell_lines(lines: impl Iterator<Item = String>) -> String {
    let joined: Vec<String> = lines.collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join("\n")
    }
}

pub fn format_levels_text(levels: &[LevelView], summary: &ResolutionSummary) -> String {
    let mut out = String::new();
    for level in levels {
        out.push_str(&format!(
            "{}\n",
            format_section_heading(&format!("Level {} (t={})", level.index, level.time))
        ));
        if level.units.is_empty() {
            out.push_str("  (empty)\n\n");
            continue;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Node", "In", "Out", "Requirements", "Effects"]);
        for unit in &level.units {
            let requirements = cell_lines(unit.requirements.iter().map(|req| {
                let mark = if req.satisfied { "ok" } else { "!!" };
                if req.producers.is_empty() {
                    format!("{} {}", mark, req.condition)
                } else {
                    format!("{} {} <- {}", mark, req.condition, req.producers.join(", "))
                }
            }));
            let effects = cell_lines(unit.effects.iter().map(|eff| {
                if eff.consumers.is_empty() {
                    eff.condition.clone()
                } else {
                    format!("{} -> {}", eff.condition, eff.consumers.join(", "))
                }
            }));
            table.add_row(vec![
                unit.node_id.clone(),
                unit.fan_in.to_string(),
                unit.fan_out.to_string(),
                requirements,
                effects,
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!("{}\n", format_section_heading("Resolution")));
    out.push_str(&format!("  Links: {}\n", summary.connections));
    out.push_str(&format!(
        "  Resolved from state: {}\n",
        summary.resolved_from_state
    ));
    if summary.unsatisfied.is_empty() {
        out.push_str(&format!("  Unsatisfied: {}\n", "0".green()));
    } else {
        out.push_str(&format!(
            "  Unsatisfied: {}\n",
            summary.unsatisfied.len().to_string().yellow()
        ));
        for entry in &summary.unsatisfied {
            out.push_str(&format!("    {} {}\n", entry.node, entry.condition));
        }
    }
    out
}

pub fn format_levels_json(
    levels: &[LevelView],
    summary: &ResolutionSummary,
    plan_digest: &str,
) -> Result<String, ApiError> {
    let out = json!({
        "plan_digest": plan_digest,
        "levels": levels,
        "summary": summary,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// One line per checked item
pub fn format_validation_text(checked: &[String]) -> String {
    let mut out = String::new();
    for item in checked {
        out.push_str(&format!("{} {}\n", "ok".green(), item));
    }
    out
}
