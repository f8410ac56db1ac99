/// Compile/run orchestration inside scratch workspaces
use crate::config::types::{merge_stderr, EngineConfig, ExecutionResult, Result, ToolchainConfig};
use crate::judge::rustc::RustcToolchain;
use crate::judge::snippet::wrap_snippet;
use crate::judge::{BuildMode, Toolchain};
use crate::safety::workspace::{Workspace, WorkspaceManager};
use std::time::Duration;

const PROGRAM_SOURCE: &str = "main.rs";
const PROGRAM_BINARY: &str = "program";
const TEST_SOURCE: &str = "lib.rs";
const TEST_BINARY: &str = "rust_tests";

/// Runs compile and execute phases of a toolchain, each invocation in its
/// own workspace that is removed however the invocation ends.
pub struct CompileRunner<T: Toolchain> {
    toolchain: T,
    workspaces: WorkspaceManager,
    compile_timeout: Duration,
    run_timeout: Duration,
    test_args: Vec<String>,
}

impl CompileRunner<RustcToolchain> {
    /// Runner backed by the configured rustc installation
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let toolchain = RustcToolchain::from_config(&config.toolchain);
        Self::with_toolchain(toolchain, config)
    }
}

impl<T: Toolchain> CompileRunner<T> {
    pub fn with_toolchain(toolchain: T, config: &EngineConfig) -> Result<Self> {
        let workspaces = WorkspaceManager::new(config.runtime_root_dir())?;
        Ok(Self::new(toolchain, workspaces, &config.toolchain))
    }

    pub fn new(toolchain: T, workspaces: WorkspaceManager, config: &ToolchainConfig) -> Self {
        Self {
            toolchain,
            workspaces,
            compile_timeout: config.compile_timeout(),
            run_timeout: config.run_timeout(),
            test_args: config.test_args.clone(),
        }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    fn prepare(&self, name: &str, source: &str) -> Result<(Workspace, std::path::PathBuf)> {
        let workspace = self.workspaces.create_workspace()?;
        let path = workspace.create_source_file(name, source)?;
        Ok((workspace, path))
    }

    /// Compile `source` as a program without running it.
    pub fn check(&self, source: &str) -> Result<ExecutionResult> {
        let (workspace, source_path) = self.prepare(PROGRAM_SOURCE, source)?;
        let binary = workspace.binary_path(PROGRAM_BINARY);

        self.toolchain
            .compile(&source_path, &binary, BuildMode::Program, self.compile_timeout)
    }

    /// Wrap `snippet`, compile it, and run the binary without arguments.
    pub fn run(&self, snippet: &str) -> Result<ExecutionResult> {
        let (workspace, source_path) = self.prepare(PROGRAM_SOURCE, &wrap_snippet(snippet))?;
        let binary = workspace.binary_path(PROGRAM_BINARY);

        let compiled =
            self.toolchain
                .compile(&source_path, &binary, BuildMode::Program, self.compile_timeout)?;
        if !compiled.success() {
            return Ok(compiled);
        }

        let ran = self
            .toolchain
            .execute(&binary, &[], BuildMode::Program, self.run_timeout)?;
        Ok(combine(&compiled, ran))
    }

    /// Compile `harness` with test linkage and run the resulting test binary.
    pub fn run_tests(&self, harness: &str) -> Result<ExecutionResult> {
        let (workspace, source_path) = self.prepare(TEST_SOURCE, harness)?;
        let binary = workspace.binary_path(TEST_BINARY);

        let compiled =
            self.toolchain
                .compile(&source_path, &binary, BuildMode::Test, self.compile_timeout)?;
        if !compiled.success() {
            log::debug!("test harness failed to compile (exit code {})", compiled.exit_code);
            return Ok(compiled);
        }

        let ran =
            self.toolchain
                .execute(&binary, &self.test_args, BuildMode::Test, self.run_timeout)?;
        Ok(combine(&compiled, ran))
    }
}

/// Run-phase result carrying compiler warnings ahead of the program's stderr.
fn combine(compiled: &ExecutionResult, ran: ExecutionResult) -> ExecutionResult {
    ExecutionResult {
        stderr: merge_stderr(&compiled.stderr, &ran.stderr),
        ..ran
    }
}
