//! Execution control
//!
//! Bounded-time process execution, bounded output capture, and the compile
//! runner that drives a toolchain inside scratch workspaces.

pub mod executor;
pub mod output;
pub mod runner;

pub use executor::CompileRunner;
