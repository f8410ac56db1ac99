//! Testing infrastructure
//!
//! Toolchain doubles for exercising scoring without a compiler installed.

pub mod scripted;

pub use scripted::{ScriptedToolchain, ToolchainCall};
