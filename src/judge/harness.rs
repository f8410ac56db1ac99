//! Test harness synthesis
//!
//! Two compilation units are built from a submission: the core program for
//! the compile-only check and the test harness.
//!
//! The core program goes through [`wrap_snippet`], so code without a
//! `fn main` ends up nested inside one. Item-only code that resolves paths
//! through `super::` or `crate::` (for example sibling modules calling
//! `super::a::f()`) therefore fails the core check even though it compiles
//! standalone and inside the harness. Such code should define its own
//! `fn main`. The harness itself always uses the unwrapped core code.

use crate::judge::snippet::{indent, wrap_snippet};

/// Prepended to every synthesized compilation unit so scaffolding the tests
/// never touch does not flood stderr with dead-code warnings.
pub const HARNESS_HEADER: &str = "#![allow(unused)]\n";

/// Name of the module that holds caller tests.
pub const TEST_MODULE: &str = "rustscore_tests";

/// Core code plus an isolated `#[cfg(test)]` module that can see it.
///
/// Blank `test_code` yields the header-prefixed core code alone.
pub fn build_harness(core_code: &str, test_code: &str) -> String {
    let core = core_code.trim_end();
    let tests = test_code.trim();
    if tests.is_empty() {
        return format!("{}{}\n", HARNESS_HEADER, core);
    }

    format!(
        "{}{}\n\n#[cfg(test)]\nmod {} {{\n    use super::*;\n{}\n}}\n",
        HARNESS_HEADER,
        core,
        TEST_MODULE,
        indent(tests, "    ")
    )
}

/// Header-prefixed program used for the compile-only check of the core code.
/// Code without an entry point is nested inside `fn main`; see the module docs
/// for what that rules out.
pub fn core_program(core_code: &str) -> String {
    format!("{}{}", HARNESS_HEADER, wrap_snippet(core_code))
}
