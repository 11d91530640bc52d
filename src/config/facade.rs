//! Entry points for loading `PlantreeConfig`.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::PlantreeConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads configuration from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Layers, lowest to highest: defaults, global file, workspace files,
    /// environment.
    pub fn load(workspace_root: &Path) -> Result<PlantreeConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = environment::add_to_builder(builder);

        let config: PlantreeConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load a single explicit file over the defaults.
    pub fn load_from_file(path: &Path) -> Result<PlantreeConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));

        let config: PlantreeConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Location of the user-level config file
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
