//! Verdict and reward
//!
//! Turns a test run's output into pass/fail counts and the counts into a
//! base reward. Both are pure functions.

pub mod parser;
pub mod reward;

pub use parser::VerdictParser;
pub use reward::reward;
