//! Environment source: `PLANTREE_<SECTION>__<KEY>`, e.g. `PLANTREE_COMPILER__STRICT=true`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "PLANTREE";

/// Add the environment as the highest-precedence source.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
