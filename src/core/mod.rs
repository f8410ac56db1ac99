//! Episode core.
//!
//! The orchestrator owns episode state and drives one step at a time through
//! compile check, optional test run, base reward and reward shaping.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
