//! rustscore: compile, test and score Rust code submissions
//!
//! Each step compiles the submitted code, optionally builds and runs a test
//! harness around it, turns the outcome into a base reward and shapes that
//! reward through an ordered chain of transforms.
//!
//! # Architecture
//!
//! ## Episode Core ([`core`])
//! - [`core::orchestrator`](crate::core::orchestrator): Episode state machine (`reset`, `step`)
//!
//! ## Judge ([`judge`])
//! - [`judge::Toolchain`]: Compile/execute capability
//! - [`judge::rustc`]: rustc-backed toolchain
//! - [`judge::snippet`]: Entry-point wrapping for bare statements
//! - [`judge::harness`]: Test harness synthesis
//!
//! ## Execution Control ([`exec`])
//! - [`exec::executor`]: Compile/run phases in scratch workspaces
//! - [`exec::runner`]: Child processes with wall-clock timeouts
//! - [`exec::output`]: Bounded output collection
//!
//! ## Verdict ([`verdict`])
//! - [`verdict::parser`]: Test report parsing
//! - [`verdict::reward`]: Base reward
//!
//! ## Scoring ([`scoring`])
//! - [`scoring::safety`]: Dangerous-pattern penalty
//! - [`scoring::quality`]: Conciseness and test-presence bonuses
//!
//! ## Safety & Cleanup ([`safety`])
//! - [`safety::workspace`]: Run-scoped scratch directories
//!
//! ## Observability ([`observability`])
//! - [`observability::audit`]: Structured engine events
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: Shared types, config and errors
//! - [`config::validator`]: Config validation
//! - [`config::presets`]: Named engine presets
//!
//! ## Testing Infrastructure ([`testing`])
//! - [`testing::scripted`]: Scripted toolchain double

// Episode core
pub mod core;

// Judge (toolchain capability and source synthesis)
pub mod judge;

// Execution Control
pub mod exec;

// Verdict
pub mod verdict;

// Reward shaping
pub mod scoring;

// Safety & Cleanup
pub mod safety;

// Observability
pub mod observability;

// Configuration
pub mod config;

// Testing Infrastructure
pub mod testing;

// CLI entrypoint wiring for the rustscore binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::types::*;
pub use crate::core::Orchestrator;
pub use exec::CompileRunner;
pub use judge::harness::build_harness;
pub use judge::rustc::RustcToolchain;
pub use judge::snippet::wrap_snippet;
pub use judge::{BuildMode, Toolchain};
pub use scoring::{QualityTransform, SafetyTransform, ScoringPipeline, Transform};
pub use verdict::{reward, VerdictParser};
