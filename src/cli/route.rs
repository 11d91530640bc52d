//! CLI route: single route table and run context. Dispatches to the compiler and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_compile_summary, format_levels_json, format_levels_text, format_validation_text,
};
use crate::config::{ConfigLoader, PlantreeConfig};
use crate::error::{ApiError, KnowledgeError};
use crate::knowledge::{DomainModel, StaticKnowledge};
use crate::tree::{hasher, Compilation, CompilerOptions, RevisitPolicy, TreeBuilder};
use crate::types::Plan;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: PlantreeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &PlantreeConfig {
        &self.config
    }

    /// Run one command and return its stdout text
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Compile {
                plan,
                domain,
                output,
                revisit,
                strict,
                digest,
            } => self.handle_compile(
                plan,
                domain.as_deref(),
                output.as_deref(),
                *revisit,
                *strict,
                *digest,
            ),
            Commands::Levels {
                plan,
                domain,
                format,
            } => self.handle_levels(plan, domain.as_deref(), format),
            Commands::Validate { domain } => self.handle_validate(domain.as_deref()),
        };
        debug!(
            duration_ms = started.elapsed().as_millis(),
            ok = result.is_ok(),
            "Command finished"
        );
        result
    }

    fn handle_compile(
        &self,
        plan_path: &Path,
        domain: Option<&Path>,
        output: Option<&Path>,
        revisit: Option<RevisitPolicy>,
        strict: bool,
        digest: bool,
    ) -> Result<String, ApiError> {
        let mut options = self.config.compiler.options();
        if let Some(revisit) = revisit {
            options.revisit = revisit;
        }
        options.strict |= strict;

        let compilation = self.compile(plan_path, domain, options)?;

        match output {
            Some(path) => {
                std::fs::write(path, compilation.tree())?;
                info!(path = %path.display(), "Wrote behaviour tree");
                Ok(format_compile_summary(path, &compilation, digest))
            }
            None if digest => Ok(compilation.digest_hex()),
            None => Ok(compilation.into_tree()),
        }
    }

    fn handle_levels(
        &self,
        plan_path: &Path,
        domain: Option<&Path>,
        format: &str,
    ) -> Result<String, ApiError> {
        if format != "text" && format != "json" {
            return Err(ApiError::ConfigError(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                format
            )));
        }
        let compilation = self.compile(plan_path, domain, self.config.compiler.options())?;
        let levels = compilation.levels();

        if format == "json" {
            let plan_digest = hasher::to_hex(compilation.plan_digest());
            format_levels_json(&levels, compilation.summary(), &plan_digest)
        } else {
            Ok(format_levels_text(&levels, compilation.summary()))
        }
    }

    fn handle_validate(&self, domain: Option<&Path>) -> Result<String, ApiError> {
        self.config.ensure_valid()?;
        let mut checked = vec![match &self.config_path {
            Some(path) => format!("configuration {}", path.display()),
            None => format!("configuration for {}", self.workspace_root.display()),
        }];

        if let Some(path) = self.domain_path(domain) {
            let model = DomainModel::load(&path)?;
            model.validate().map_err(|errors| {
                KnowledgeError::Load(format!(
                    "Domain {} is invalid:\n{}",
                    path.display(),
                    errors.join("\n")
                ))
            })?;
            checked.push(format!(
                "domain {} ({} actions)",
                path.display(),
                model.actions.len()
            ));
        }

        Ok(format_validation_text(&checked))
    }

    fn compile(
        &self,
        plan_path: &Path,
        domain: Option<&Path>,
        options: CompilerOptions,
    ) -> Result<Compilation, ApiError> {
        let domain_path = self.domain_path(domain).ok_or_else(|| {
            ApiError::ConfigError(
                "No domain file: pass --domain or set inputs.domain_file".to_string(),
            )
        })?;
        let knowledge = StaticKnowledge::load(&domain_path)?;
        let plan = Plan::load(plan_path)?;

        let compilation = TreeBuilder::new(&knowledge)
            .with_options(options)
            .compile(&plan)?;
        Ok(compilation)
    }

    /// `--domain` as given, else `inputs.domain_file` relative to the workspace
    fn domain_path(&self, domain: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = domain {
            return Some(path.to_path_buf());
        }
        self.config.inputs.domain_file.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.workspace_root.join(path)
            }
        })
    }
}
