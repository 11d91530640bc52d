//! CLI parsing and command routing

use super::test_utils::{demo_knowledge, demo_path, demo_plan, with_isolated_home};
use clap::Parser;
use plantree::cli::{map_error, Cli, Commands, RunContext};
use plantree::tree::{RevisitPolicy, TreeBuilder};
use std::path::PathBuf;

fn compile_command(args: &[&str]) -> Commands {
    let mut argv = vec!["plantree", "compile"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

#[test]
fn test_parse_compile_flags() {
    let cli = Cli::try_parse_from([
        "plantree",
        "--workspace",
        "/tmp/ws",
        "--log-format",
        "json",
        "compile",
        "plan.txt",
        "--domain",
        "domain.json",
        "--revisit",
        "expand",
        "--strict",
        "-o",
        "tree.xml",
    ])
    .unwrap();

    assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
    assert_eq!(cli.log_format.as_deref(), Some("json"));
    match cli.command {
        Commands::Compile {
            plan,
            domain,
            output,
            revisit,
            strict,
            digest,
        } => {
            assert_eq!(plan, PathBuf::from("plan.txt"));
            assert_eq!(domain, Some(PathBuf::from("domain.json")));
            assert_eq!(output, Some(PathBuf::from("tree.xml")));
            assert_eq!(revisit, Some(RevisitPolicy::Expand));
            assert!(strict);
            assert!(!digest);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_rejects_unknown_revisit_policy() {
    assert!(Cli::try_parse_from(["plantree", "compile", "p.txt", "--revisit", "twice"]).is_err());
}

#[test]
fn test_compile_prints_tree() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let plan = demo_path("plan.txt");
        let domain = demo_path("domain.json");
        let command = compile_command(&[
            plan.to_str().unwrap(),
            "--domain",
            domain.to_str().unwrap(),
        ]);

        let output = context.execute(&command).unwrap();
        let expected = TreeBuilder::new(&demo_knowledge())
            .get_tree(&demo_plan())
            .unwrap();
        assert_eq!(output, expected);
    });
}

#[test]
fn test_compile_writes_output_file_and_digest() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let plan = demo_path("plan.txt");
        let domain = demo_path("domain.json");
        let target = workspace.join("tree.xml");
        let command = compile_command(&[
            plan.to_str().unwrap(),
            "--domain",
            domain.to_str().unwrap(),
            "--output",
            target.to_str().unwrap(),
            "--digest",
        ]);

        let output = context.execute(&command).unwrap();
        let written = std::fs::read_to_string(&target).unwrap();
        let compilation = TreeBuilder::new(&demo_knowledge())
            .compile(&demo_plan())
            .unwrap();
        assert_eq!(written, compilation.tree());
        assert!(output.contains("6 actions"));
        assert!(output.contains(&compilation.digest_hex()));
    });
}

#[test]
fn test_domain_file_from_workspace_config() {
    with_isolated_home(|_, workspace| {
        let ws_config = workspace.join("config");
        std::fs::create_dir_all(&ws_config).unwrap();
        std::fs::copy(demo_path("domain.json"), workspace.join("factory.json")).unwrap();
        std::fs::write(
            ws_config.join("config.toml"),
            "[inputs]\ndomain_file = \"factory.json\"\n",
        )
        .unwrap();

        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let plan = demo_path("plan.txt");
        let output = context
            .execute(&compile_command(&[plan.to_str().unwrap(), "--digest"]))
            .unwrap();
        assert_eq!(output.len(), 64);
    });
}

#[test]
fn test_compile_without_domain_fails() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let plan = demo_path("plan.txt");
        let err = context
            .execute(&compile_command(&[plan.to_str().unwrap()]))
            .unwrap_err();
        assert!(map_error(&err).contains("--domain"));
    });
}

#[test]
fn test_strict_compile_reports_unsatisfied() {
    with_isolated_home(|_, workspace| {
        let plan = workspace.join("plan.txt");
        std::fs::write(&plan, "0.000: (pick r2 box bench)  [2.000]\n").unwrap();
        let domain = demo_path("domain.json");

        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let err = context
            .execute(&compile_command(&[
                plan.to_str().unwrap(),
                "--domain",
                domain.to_str().unwrap(),
                "--strict",
            ]))
            .unwrap_err();
        let message = map_error(&err);
        assert!(message.contains("2 requirement(s) left unsatisfied"));
        assert!(message.contains("(pick r2 box bench):0 (object_at box bench)"));
    });
}

#[test]
fn test_levels_json() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let plan = demo_path("plan.txt");
        let domain = demo_path("domain.json");
        let cli = Cli::try_parse_from([
            "plantree",
            "levels",
            plan.to_str().unwrap(),
            "--domain",
            domain.to_str().unwrap(),
            "--format",
            "json",
        ])
        .unwrap();

        let output = context.execute(&cli.command).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["levels"].as_array().unwrap().len(), 4);
        assert_eq!(value["summary"]["connections"], 8);
        assert_eq!(value["plan_digest"].as_str().unwrap().len(), 64);
    });
}

#[test]
fn test_levels_rejects_unknown_format() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let cli =
            Cli::try_parse_from(["plantree", "levels", "plan.txt", "--format", "yaml"]).unwrap();
        assert!(context.execute(&cli.command).is_err());
    });
}

#[test]
fn test_validate_command() {
    with_isolated_home(|_, workspace| {
        let context = RunContext::new(workspace.to_path_buf(), None).unwrap();
        let domain = demo_path("domain.json");
        let cli = Cli::try_parse_from([
            "plantree",
            "validate",
            "--domain",
            domain.to_str().unwrap(),
        ])
        .unwrap();
        let output = context.execute(&cli.command).unwrap();
        assert!(output.contains("4 actions"));

        let bad = workspace.join("bad.json");
        std::fs::write(
            &bad,
            r#"{ "actions": [ { "name": "go", "parameters": ["r"] }, { "name": "go" } ] }"#,
        )
        .unwrap();
        let cli = Cli::try_parse_from(["plantree", "validate", "--domain", bad.to_str().unwrap()])
            .unwrap();
        let message = map_error(&context.execute(&cli.command).unwrap_err());
        assert!(message.contains("must start with '?'"));
        assert!(message.contains("Duplicate action 'go'"));
    });
}
