/// Scripted toolchain
/// Answers compile and execute calls from queued results and records every
/// call, so scoring logic can be exercised without rustc installed.
use crate::config::types::{ExecutionResult, Result};
use crate::judge::{BuildMode, Toolchain};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded toolchain call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainCall {
    Compile {
        mode: BuildMode,
        /// Source text as it was on disk during the call
        source: String,
        workdir: PathBuf,
    },
    Execute {
        mode: BuildMode,
        args: Vec<String>,
    },
}

impl ToolchainCall {
    pub fn is_compile(&self, wanted: BuildMode) -> bool {
        matches!(self, ToolchainCall::Compile { mode, .. } if *mode == wanted)
    }

    pub fn is_execute(&self) -> bool {
        matches!(self, ToolchainCall::Execute { .. })
    }
}

/// Queued results are consumed front to back; an empty queue answers with a
/// clean exit and no output.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    compiles: Mutex<VecDeque<ExecutionResult>>,
    executions: Mutex<VecDeque<ExecutionResult>>,
    calls: Mutex<Vec<ToolchainCall>>,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile_with(self, result: ExecutionResult) -> Self {
        lock(&self.compiles).push_back(result);
        self
    }

    pub fn execute_with(self, result: ExecutionResult) -> Self {
        lock(&self.executions).push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<ToolchainCall> {
        lock(&self.calls).clone()
    }

    /// Source text of every compile call, in order
    pub fn compiled_sources(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ToolchainCall::Compile { source, .. } => Some(source.clone()),
                ToolchainCall::Execute { .. } => None,
            })
            .collect()
    }

    pub fn execute_count(&self) -> usize {
        lock(&self.calls).iter().filter(|c| c.is_execute()).count()
    }

    fn next(queue: &Mutex<VecDeque<ExecutionResult>>) -> ExecutionResult {
        lock(queue)
            .pop_front()
            .unwrap_or_else(|| ExecutionResult::new("", "", 0))
    }
}

impl Toolchain for ScriptedToolchain {
    fn compile(
        &self,
        source: &Path,
        _output: &Path,
        mode: BuildMode,
        _timeout: Duration,
    ) -> Result<ExecutionResult> {
        let text = std::fs::read_to_string(source)?;
        let workdir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        lock(&self.calls).push(ToolchainCall::Compile {
            mode,
            source: text,
            workdir,
        });
        Ok(Self::next(&self.compiles))
    }

    fn execute(
        &self,
        _binary: &Path,
        args: &[String],
        mode: BuildMode,
        _timeout: Duration,
    ) -> Result<ExecutionResult> {
        lock(&self.calls).push(ToolchainCall::Execute {
            mode,
            args: args.to_vec(),
        });
        Ok(Self::next(&self.executions))
    }
}

// A panic while holding the lock only ever happens inside a failing test;
// the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
