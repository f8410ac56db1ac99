//! Judge layer.
//!
//! The orchestrator and reward logic only see the `Toolchain` capability;
//! the rustc adapter is one implementation, scripted fakes in tests are
//! another. Source synthesis (snippet wrapping, test harnesses) lives here too.

pub mod harness;
pub mod rustc;
pub mod snippet;

use crate::config::types::{ExecutionResult, Result};
use std::path::Path;
use std::time::Duration;

/// Whether the compiler links a normal program or a test harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Program,
    Test,
}

impl BuildMode {
    /// Names the compiler invocation in timeout messages
    pub fn compile_label(self) -> &'static str {
        match self {
            BuildMode::Program => "rustc",
            BuildMode::Test => "rustc --test",
        }
    }

    /// Names the binary run in timeout messages
    pub fn run_label(self) -> &'static str {
        match self {
            BuildMode::Program => "binary execution",
            BuildMode::Test => "test binary",
        }
    }
}

/// Compile/execute capability.
///
/// `Err` means the toolchain itself could not be driven (missing binary,
/// broken workspace). Anything the submitted code does, including hanging
/// past `timeout`, comes back as an `ExecutionResult`.
pub trait Toolchain {
    fn compile(
        &self,
        source: &Path,
        output: &Path,
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult>;

    /// Run a binary built in `mode`.
    fn execute(
        &self,
        binary: &Path,
        args: &[String],
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult>;
}

impl<T: Toolchain + ?Sized> Toolchain for Box<T> {
    fn compile(
        &self,
        source: &Path,
        output: &Path,
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        (**self).compile(source, output, mode, timeout)
    }

    fn execute(
        &self,
        binary: &Path,
        args: &[String],
        mode: BuildMode,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        (**self).execute(binary, args, mode, timeout)
    }
}
