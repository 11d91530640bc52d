//! Configuration loading through the public API

use super::test_utils::with_isolated_home;
use plantree::config::{ConfigLoader, PlantreeConfig, ValidationError};
use plantree::tree::RevisitPolicy;
use std::path::PathBuf;

#[test]
fn test_defaults_without_any_source() {
    with_isolated_home(|_, workspace| {
        let config = ConfigLoader::load(workspace).unwrap();
        assert_eq!(config, PlantreeConfig::default());
        assert_eq!(config.logging.output, "stderr");
    });
}

#[test]
fn test_layer_precedence() {
    with_isolated_home(|home, workspace| {
        let global = home.join(".config").join("plantree");
        std::fs::create_dir_all(&global).unwrap();
        std::fs::write(
            global.join("config.toml"),
            "[compiler]\nrevisit_policy = \"expand\"\nstrict = true\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let ws_config = workspace.join("config");
        std::fs::create_dir_all(&ws_config).unwrap();
        std::fs::write(
            ws_config.join("config.toml"),
            "[compiler]\nstrict = false\n\n[inputs]\ndomain_file = \"domain.toml\"\n",
        )
        .unwrap();
        std::fs::write(
            ws_config.join("staging.toml"),
            "[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        std::env::set_var("PLANTREE_ENV", "staging");
        std::env::set_var("PLANTREE_COMPILER__REVISIT_POLICY", "skip");

        let config = ConfigLoader::load(workspace).unwrap();
        // env beats global
        assert_eq!(config.compiler.revisit_policy, RevisitPolicy::Skip);
        // workspace beats global
        assert!(!config.compiler.strict);
        // untouched global keys survive
        assert_eq!(config.logging.format, "json");
        // env-specific workspace file applies
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.inputs.domain_file, Some(PathBuf::from("domain.toml")));
    });
}

#[test]
fn test_explicit_file_skips_other_layers() {
    with_isolated_home(|home, workspace| {
        let global = home.join(".config").join("plantree");
        std::fs::create_dir_all(&global).unwrap();
        std::fs::write(global.join("config.toml"), "[compiler]\nstrict = true\n").unwrap();

        let explicit = workspace.join("only.toml");
        std::fs::write(&explicit, "[logging]\nlevel = \"error\"\n").unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        assert!(!config.compiler.strict);
        assert_eq!(config.logging.level, "error");
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    with_isolated_home(|_, workspace| {
        let err = ConfigLoader::load_from_file(&workspace.join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    });
}

#[test]
fn test_validation_reports_every_section() {
    let mut config = PlantreeConfig::default();
    config.inputs.domain_file = Some(PathBuf::from("domain.yaml"));
    config.logging.output = "syslog".to_string();

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(matches!(&errors[0], ValidationError::Inputs(msg) if msg.contains("domain.yaml")));
    assert!(matches!(&errors[1], ValidationError::Logging(msg) if msg.contains("syslog")));
}
