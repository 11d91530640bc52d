//! Workspace config file source: config/config.toml and config/{env}.toml

use crate::config::ENV_NAME_VAR;
use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use std::path::Path;

/// Add workspace config files to builder.
/// Precedence: config/config.toml (base) then config/{PLANTREE_ENV}.toml.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_NAME_VAR).unwrap_or_else(|_| "development".to_string());

    let mut builder = builder;

    let base_config_path = config_dir.join("config.toml");
    if base_config_path.exists() {
        builder = builder.add_source(File::from(base_config_path).required(false));
    }

    let env_config_path = config_dir.join(format!("{}.toml", env_name));
    if env_config_path.exists() {
        builder = builder.add_source(File::from(env_config_path).required(false));
    }

    builder
}
