//! CLI domain: parse, route, output, and presentation only.
//! No compiler logic; a single route table dispatches to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_compile_summary, format_levels_json, format_levels_text, format_validation_text,
};
pub use route::RunContext;
