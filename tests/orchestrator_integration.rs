//! Integration tests for the orchestrator
//!
//! Drives full episodes against a scripted toolchain, so no compiler is needed.

use rustscore::testing::{ScriptedToolchain, ToolchainCall};
use rustscore::{
    Action, BuildMode, EngineConfig, ExecutionResult, Orchestrator, ScoringError,
    META_SAFETY_VIOLATION,
};
use std::time::Duration;
use tempfile::TempDir;

struct Episode {
    orchestrator: Orchestrator<ScriptedToolchain>,
    // Keeps the scratch root alive for the episode
    _root: TempDir,
}

fn episode(toolchain: ScriptedToolchain) -> Episode {
    let root = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        workspace_root: Some(root.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let mut orchestrator = Orchestrator::with_toolchain(toolchain, config).unwrap();
    orchestrator.reset();
    Episode {
        orchestrator,
        _root: root,
    }
}

const ADD: &str = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}";
const ADD_TESTS: &str = "#[test]\nfn adds_small() {\n    assert_eq!(add(1, 2), 3);\n}\n\n\
#[test]\nfn adds_negative() {\n    assert_eq!(add(-1, 1), 0);\n}";

#[test]
fn test_scenario_statements_only() {
    let mut ep = episode(ScriptedToolchain::new());

    let obs = ep
        .orchestrator
        .step(&Action::new("println!(\"hi\");", ""))
        .unwrap();

    assert!(obs.compiles);
    assert_eq!(obs.exit_code, 0);
    assert_eq!((obs.tests_passed, obs.tests_failed), (0, 0));
    // base 1, +0.5 concise
    assert_eq!(obs.reward, 1.5);

    let toolchain = ep.orchestrator.runner().toolchain();
    assert_eq!(
        toolchain.compiled_sources(),
        vec!["#![allow(unused)]\nfn main() {\n    println!(\"hi\");\n}\n"]
    );
    assert_eq!(toolchain.execute_count(), 0);
}

#[test]
fn test_scenario_syntax_error() {
    let mut ep = episode(
        ScriptedToolchain::new().compile_with(ExecutionResult::new(
            "",
            "error: expected expression, found `;`",
            1,
        )),
    );

    let obs = ep.orchestrator.step(&Action::new("let x = ;", "")).unwrap();

    assert!(!obs.compiles);
    assert_eq!(obs.exit_code, 1);
    assert_eq!(obs.stderr, "error: expected expression, found `;`");
    assert_eq!((obs.tests_passed, obs.tests_failed), (0, 0));
    // base -3, +0.5 concise
    assert_eq!(obs.reward, -2.5);

    let state = ep.orchestrator.state().unwrap();
    assert!(!state.last_compiles);
    assert_eq!(state.last_exit_code, 1);
}

#[test]
fn test_scenario_passing_tests() {
    let mut ep = episode(ScriptedToolchain::new().execute_with(ExecutionResult::new(
        "\nrunning 2 tests\ntest rustscore_tests::adds_small ... ok\n\
test rustscore_tests::adds_negative ... ok\n\n\
test result: ok. 2 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out\n",
        "",
        0,
    )));

    let obs = ep.orchestrator.step(&Action::new(ADD, ADD_TESTS)).unwrap();

    assert!(obs.compiles);
    assert_eq!((obs.tests_passed, obs.tests_failed), (2, 0));
    assert!(obs.stdout.contains("test result: ok."));
    // base 1 + 6 + 2, +0.5 concise, +1 test marker
    assert_eq!(obs.reward, 10.5);
    assert_eq!(obs.last_code(), format!("{}\n\n{}", ADD, ADD_TESTS));

    let toolchain = ep.orchestrator.runner().toolchain();
    let calls = toolchain.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].is_compile(BuildMode::Program));
    assert!(calls[1].is_compile(BuildMode::Test));
    assert_eq!(
        calls[2],
        ToolchainCall::Execute {
            mode: BuildMode::Test,
            args: vec!["--nocapture".to_string()]
        }
    );

    // The harness is built from the unwrapped core code
    let harness = &toolchain.compiled_sources()[1];
    assert!(harness.starts_with("#![allow(unused)]\nfn add(a: i32, b: i32) -> i32 {"));
    assert!(harness.contains("#[cfg(test)]\nmod rustscore_tests {\n    use super::*;\n"));

    let state = ep.orchestrator.state().unwrap();
    assert_eq!(state.step_count, 1);
    assert_eq!(state.total_tests_passed, 2);
    assert_eq!(state.total_tests_failed, 0);
}

#[test]
fn test_scenario_destructive_filesystem_call() {
    let mut ep = episode(ScriptedToolchain::new());

    let core = "fn main() {\n    let _ = std::fs::remove_file(\"data.txt\");\n}";
    let obs = ep.orchestrator.step(&Action::new(core, "")).unwrap();

    assert!(obs.compiles);
    // base 1, -3 safety, +0.5 concise
    assert_eq!(obs.reward, -1.5);
    assert_eq!(
        obs.metadata.get(META_SAFETY_VIOLATION).map(String::as_str),
        Some("std::fs::remove_")
    );
}

#[test]
fn test_scenario_test_binary_timeout() {
    let mut ep = episode(ScriptedToolchain::new().execute_with(ExecutionResult::timeout(
        BuildMode::Test.run_label(),
        Duration::from_secs(10),
    )));

    let tests = "#[test]\nfn spins() {\n    loop {}\n}";
    let obs = ep.orchestrator.step(&Action::new(ADD, tests)).unwrap();

    assert!(obs.compiles);
    assert_eq!(obs.exit_code, 1);
    assert!(obs.stderr.contains("test binary timed out after 10s"));
    assert_eq!((obs.tests_passed, obs.tests_failed), (0, 1));
    // base 1 - 1, +0.5 concise, +1 test marker
    assert_eq!(obs.reward, 1.5);
}

#[test]
fn test_failing_tests_with_report() {
    let mut ep = episode(ScriptedToolchain::new().execute_with(ExecutionResult::new(
        "test result: FAILED. 1 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out",
        "thread 'rustscore_tests::adds_negative' panicked",
        101,
    )));

    let obs = ep.orchestrator.step(&Action::new(ADD, ADD_TESTS)).unwrap();

    assert_eq!((obs.tests_passed, obs.tests_failed), (1, 1));
    assert_eq!(obs.exit_code, 101);
    // base 1 + 3 - 1, +0.5 concise, +1 test marker
    assert_eq!(obs.reward, 4.5);
}

#[test]
fn test_crash_without_report_counts_one_failure() {
    let mut ep = episode(
        ScriptedToolchain::new().execute_with(ExecutionResult::new("", "Segmentation fault", 139)),
    );

    let obs = ep.orchestrator.step(&Action::new(ADD, ADD_TESTS)).unwrap();

    assert_eq!((obs.tests_passed, obs.tests_failed), (0, 1));
    assert_eq!(obs.exit_code, 139);
}

#[test]
fn test_multi_step_episode() {
    let mut ep = episode(
        ScriptedToolchain::new()
            .compile_with(ExecutionResult::new("", "error[E0308]: mismatched types", 1))
            .execute_with(ExecutionResult::new(
                "test result: ok. 2 passed; 0 failed;",
                "",
                0,
            )),
    );

    let first = ep
        .orchestrator
        .step(&Action::new("fn add(a: i32, b: i32) -> i32 { \"no\" }", ADD_TESTS))
        .unwrap();
    assert!(!first.compiles);

    let second = ep.orchestrator.step(&Action::new(ADD, ADD_TESTS)).unwrap();
    assert!(second.compiles);
    assert_eq!(second.tests_passed, 2);

    let state = ep.orchestrator.state().unwrap();
    assert_eq!(state.step_count, 2);
    assert!(state.last_compiles);
    assert_eq!(state.last_exit_code, 0);
    assert_eq!(state.total_tests_passed, 2);
}

#[test]
fn test_usage_errors_are_not_scored() {
    let root = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        workspace_root: Some(root.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let mut orchestrator =
        Orchestrator::with_toolchain(ScriptedToolchain::new(), config).unwrap();

    let err = orchestrator.step(&Action::new(ADD, "")).unwrap_err();
    assert!(matches!(err, ScoringError::EpisodeNotStarted));

    orchestrator.reset();
    let err = orchestrator
        .step_json(&serde_json::json!({"source": ADD}))
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidAction(_)));
    assert!(orchestrator.runner().toolchain().calls().is_empty());
}

#[test]
fn test_scratch_directories_do_not_accumulate() {
    let mut ep = episode(ScriptedToolchain::new());

    for _ in 0..3 {
        ep.orchestrator.step(&Action::new(ADD, ADD_TESTS)).unwrap();
    }

    let root = ep.orchestrator.runner().workspaces().base_dir().to_path_buf();
    let leftovers: Vec<_> = std::fs::read_dir(&root).unwrap().collect();
    assert!(leftovers.is_empty(), "leftover scratch dirs: {:?}", leftovers);
}
