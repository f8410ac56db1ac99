/// Bounded-time process execution
use crate::config::types::{ExecutionResult, Result, ScoringError};
use crate::exec::output::OutputCollector;
use crate::observability::audit::events;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One process invocation with a wall-clock bound
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    /// Program followed by its arguments
    pub argv: &'a [String],
    pub workdir: &'a Path,
    pub timeout: Duration,
    /// Per-stream capture cap in bytes
    pub output_limit: usize,
    /// Names the invocation in the timeout message, e.g. `rustc --test`
    pub timeout_label: &'a str,
}

/// Spawn `argv` in its own process group and wait for it, killing the whole
/// group once `timeout` elapses. Timeouts come back as a failing
/// `ExecutionResult`; only spawn and wait failures are errors.
pub fn run_with_timeout(req: &RunRequest<'_>) -> Result<ExecutionResult> {
    let program = req
        .argv
        .first()
        .ok_or_else(|| ScoringError::Process("Empty command provided".to_string()))?;

    let mut cmd = Command::new(program);
    cmd.args(&req.argv[1..])
        .current_dir(req.workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);

    let mut child = cmd
        .spawn()
        .map_err(|e| ScoringError::Process(format!("spawn {}: {}", program, e)))?;
    log::debug!("spawned {:?} as pid {}", req.argv, child.id());

    let stdout = OutputCollector::spawn(child.stdout.take(), req.output_limit);
    let stderr = OutputCollector::spawn(child.stderr.take(), req.output_limit);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if started.elapsed() >= req.timeout {
                    terminate_group(&mut child);
                    break None;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                terminate_group(&mut child);
                return Err(ScoringError::Process(format!("wait {}: {}", program, e)));
            }
        }
    };

    // Descendants left in the group still hold the pipes; readers see EOF
    // only once they are gone.
    if status.is_some() {
        kill_leftovers(&child);
    }
    let stdout = stdout.finish();
    let stderr = stderr.finish();

    match status {
        Some(status) => Ok(ExecutionResult::new(
            stdout.into_text(),
            stderr.into_text(),
            exit_code_of(status),
        )),
        None => {
            events::timeout_enforced(req.timeout_label, req.timeout);
            Ok(ExecutionResult::timeout(req.timeout_label, req.timeout))
        }
    }
}

/// SIGKILL the child's process group, then reap the child.
fn terminate_group(child: &mut Child) {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        log::debug!("killpg({}) failed: {}; killing child directly", pgid, e);
        let _ = child.kill();
    }
    if let Err(e) = child.wait() {
        log::warn!("failed to reap pid {}: {}", pgid, e);
    }
}

/// SIGKILL whatever is left in the process group of an already reaped child.
fn kill_leftovers(child: &Child) {
    let pgid = Pid::from_raw(child.id() as i32);
    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) => log::debug!("killed leftover processes in group {}", pgid),
        Err(Errno::ESRCH) => {}
        Err(e) => log::warn!("killpg({}) failed: {}", pgid, e),
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}
