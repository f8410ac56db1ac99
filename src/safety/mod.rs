//! Safety and cleanup
//!
//! Run-scoped scratch directories that never outlive the invocation using them.

pub mod workspace;
