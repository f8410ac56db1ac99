/// Core types and structures for the rustscore engine
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Metadata key holding the caller's core code verbatim.
pub const META_CORE_CODE: &str = "core_code";
/// Metadata key holding the caller's test code verbatim.
pub const META_TEST_CODE: &str = "test_code";
/// Metadata key holding the trimmed concatenation of core and test code.
pub const META_LAST_CODE: &str = "last_code";
/// Metadata key set by the safety transform when a dangerous pattern matched.
pub const META_SAFETY_VIOLATION: &str = "safety_violation";

/// Outcome of one compiler invocation or one binary run
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code of the process (1 for timeouts, 128 + signal for signal deaths)
    pub exit_code: i32,
    /// Set when the wall-clock bound expired and the process group was killed
    #[serde(default)]
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            timed_out: false,
        }
    }

    /// Synthetic result for a process killed after `limit` elapsed.
    pub fn timeout(label: &str, limit: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{} timed out after {}", label, format_limit(limit)),
            exit_code: 1,
            timed_out: true,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined the way the verdict parser expects them
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Render a timeout bound as `10s` or `250ms`.
pub fn format_limit(limit: Duration) -> String {
    if limit.subsec_millis() == 0 && limit.as_secs() > 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

/// Join compile-phase and run-phase stderr.
pub fn merge_stderr(compile_stderr: &str, run_stderr: &str) -> String {
    match (compile_stderr.is_empty(), run_stderr.is_empty()) {
        (false, false) => format!("{}\n{}", compile_stderr, run_stderr),
        (false, true) => compile_stderr.to_string(),
        _ => run_stderr.to_string(),
    }
}

/// Passed/failed counts extracted from a test run
#[derive(Default, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: u32,
    pub failed: u32,
}

impl TestSummary {
    pub fn new(passed: u32, failed: u32) -> Self {
        Self { passed, failed }
    }

    pub fn is_empty(&self) -> bool {
        self.passed == 0 && self.failed == 0
    }

    /// An unparsed report from a run that exited non-zero counts as one failure.
    pub fn forced_for_exit(self, exit_code: i32) -> Self {
        if exit_code != 0 && self.is_empty() {
            Self::new(0, 1)
        } else {
            self
        }
    }
}

/// One step request: the code under evaluation and optional test statements
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Action {
    pub core_code: String,
    #[serde(default)]
    pub test_code: String,
}

impl Action {
    pub fn new(core_code: impl Into<String>, test_code: impl Into<String>) -> Self {
        Self {
            core_code: core_code.into(),
            test_code: test_code.into(),
        }
    }

    /// Trimmed concatenation of core and test code, as seen by the scoring pipeline.
    pub fn combined_code(&self) -> String {
        format!("{}\n\n{}", self.core_code, self.test_code)
            .trim()
            .to_string()
    }

    pub fn has_tests(&self) -> bool {
        !self.test_code.trim().is_empty()
    }
}

/// Per-step result handed back to the caller
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub tests_passed: u32,
    pub tests_failed: u32,
    pub compiles: bool,
    pub reward: f64,
    pub metadata: BTreeMap<String, String>,
}

impl Observation {
    /// Observation returned by `reset`: compiles, zero counts, empty code keys.
    pub fn neutral() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_CORE_CODE.to_string(), String::new());
        metadata.insert(META_TEST_CODE.to_string(), String::new());
        metadata.insert(META_LAST_CODE.to_string(), String::new());
        Self {
            compiles: true,
            metadata,
            ..Self::default()
        }
    }

    /// Code the scoring transforms inspect. Missing key reads as empty.
    pub fn last_code(&self) -> &str {
        self.metadata
            .get(META_LAST_CODE)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn safety_violation(&self) -> Option<&str> {
        self.metadata.get(META_SAFETY_VIOLATION).map(String::as_str)
    }
}

/// Episode bookkeeping owned by one orchestrator
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeState {
    pub episode_id: String,
    pub step_count: u64,
    pub last_exit_code: i32,
    pub last_compiles: bool,
    /// Tests passed in the most recent step. Overwritten each step, not summed
    /// across the episode.
    pub total_tests_passed: u32,
    /// Tests failed in the most recent step. Overwritten each step, not summed
    /// across the episode.
    pub total_tests_failed: u32,
}

impl EpisodeState {
    pub fn new(episode_id: String) -> Self {
        Self {
            episode_id,
            ..Self::default()
        }
    }
}

/// Toolchain invocation settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable, resolved through PATH when not absolute
    pub rustc: String,
    /// Value passed to `--edition`
    pub edition: String,
    /// Wall-clock bound for each compiler invocation
    pub compile_timeout_ms: u64,
    /// Wall-clock bound for each binary run
    pub run_timeout_ms: u64,
    /// Positional arguments passed to compiled test binaries
    pub test_args: Vec<String>,
    /// Per-stream capture cap in bytes
    pub output_limit_bytes: usize,
}

impl ToolchainConfig {
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            rustc: "rustc".to_string(),
            edition: "2021".to_string(),
            compile_timeout_ms: 10_000,
            run_timeout_ms: 10_000,
            test_args: vec!["--nocapture".to_string()],
            output_limit_bytes: 1024 * 1024, // 1 MiB per stream
        }
    }
}

/// Reward shaping applied after the base reward
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Subtracted once when any dangerous pattern matches
    pub safety_penalty: f64,
    /// Regexes checked in order; first match wins
    pub dangerous_patterns: Vec<String>,
    /// Added when the trimmed code is non-empty and at most `max_length` chars
    pub concise_bonus: f64,
    /// Added when the code contains `test_marker`
    pub test_bonus: f64,
    pub max_length: usize,
    pub test_marker: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            safety_penalty: 3.0,
            dangerous_patterns: default_dangerous_patterns(),
            concise_bonus: 0.5,
            test_bonus: 1.0,
            max_length: 250,
            test_marker: "#[test]".to_string(),
        }
    }
}

/// Process spawning, unsafe blocks, destructive filesystem calls, raw networking.
pub fn default_dangerous_patterns() -> Vec<String> {
    [
        r"std::process::Command",
        r"Command::new",
        r"unsafe\s*\{",
        r"std::fs::remove_",
        r"std::net::",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// Engine configuration, fixed at construction time
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub toolchain: ToolchainConfig,
    pub scoring: ScoringConfig,
    /// Parent directory for per-invocation scratch directories
    pub workspace_root: Option<PathBuf>,
}

impl EngineConfig {
    /// Load a JSON config file; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            ScoringError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Scratch root scoped by effective UID so root and non-root runs never collide.
    pub fn runtime_root_dir(&self) -> PathBuf {
        if let Some(root) = &self.workspace_root {
            return root.clone();
        }
        let euid = unsafe { libc::geteuid() };
        std::env::temp_dir().join(format!("rustscore-uid-{}", euid))
    }
}

/// Custom error types for rustscore
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("step called before reset")]
    EpisodeNotStarted,
}

pub type Result<T> = std::result::Result<T, ScoringError>;
