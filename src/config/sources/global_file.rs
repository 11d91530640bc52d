//! Global config file source: `<user config dir>/plantree/config.toml`
//! (`$XDG_CONFIG_HOME` or `~/.config` on Linux).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use directories::BaseDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("plantree").join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Using global configuration file");
            builder.add_source(File::from(path).required(false))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            builder
        }
        None => builder,
    }
}
