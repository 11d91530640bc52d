//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key, so a workspace file that
//! sets only `compiler.strict` keeps every other key from lower layers.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("compiler.revisit_policy", "skip")?
        .set_default("compiler.strict", false)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.color", true)
}
