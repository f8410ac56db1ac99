use crate::config::types::{ExecutionResult, Result, ToolchainConfig};
use crate::exec::runner::{run_with_timeout, RunRequest};
use crate::judge::{BuildMode, Toolchain};
use std::path::Path;
use std::time::Duration;

/// Drives a real `rustc` installation.
#[derive(Debug, Clone)]
pub struct RustcToolchain {
    rustc: String,
    edition: String,
    output_limit: usize,
}

impl RustcToolchain {
    pub fn new(rustc: impl Into<String>, edition: impl Into<String>, output_limit: usize) -> Self {
        Self {
            rustc: rustc.into(),
            edition: edition.into(),
            output_limit,
        }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(&config.rustc, &config.edition, config.output_limit_bytes)
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    /// `rustc [--test] <source> --edition <edition> -o <output>`
    pub fn compile_command(&self, source: &Path, output: &Path, mode: BuildMode) -> Vec<String> {
        let mut argv = vec![self.rustc.clone()];
        if mode == BuildMode::Test {
            argv.push("--test".to_string());
        }
        argv.extend([
            source.to_string_lossy().to_string(),
            "--edition".to_string(),
            self.edition.clone(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
        ]);
        argv
    }

    pub fn run_command(&self, binary: &Path, args: &[String]) -> Vec<String> {
        let mut argv = vec![binary.to_string_lossy().to_string()];
        argv.extend(args.iter().cloned());
        argv
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

impl Toolchain for RustcToolchain {
    fn compile(
        &self,
        source: &Path,
        output: &Path,
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        let argv = self.compile_command(source, output, mode);
        run_with_timeout(&RunRequest {
            argv: &argv,
            workdir: parent_dir(source),
            timeout,
            output_limit: self.output_limit,
            timeout_label: mode.compile_label(),
        })
    }

    fn execute(
        &self,
        binary: &Path,
        args: &[String],
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        let argv = self.run_command(binary, args);
        run_with_timeout(&RunRequest {
            argv: &argv,
            workdir: parent_dir(binary),
            timeout,
            output_limit: self.output_limit,
            timeout_label: mode.run_label(),
        })
    }
}
