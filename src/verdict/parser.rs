/// Test report parsing
/// Derives a (passed, failed) verdict from free-form test binary output.
///
/// libtest's report line is the only source of truth here. Two patterns are
/// tried in a fixed order: the labelled `test result:` line first, then the
/// bare `N passed; M failed` phrasing. A change to libtest's report format
/// needs a matching change here.
use crate::config::types::TestSummary;
use regex::{Captures, Regex};

/// Verdict parser - pure function over captured output
#[derive(Debug, Clone)]
pub struct VerdictParser {
    strict: Regex,
    loose: Regex,
}

impl VerdictParser {
    pub fn new() -> Self {
        Self {
            strict: Regex::new(r"test result:\s*(ok|FAILED)\.\s*(\d+)\s+passed;\s*(\d+)\s+failed")
                .expect("strict report pattern is valid"),
            loose: Regex::new(r"(\d+)\s+passed;\s*(\d+)\s+failed")
                .expect("loose report pattern is valid"),
        }
    }

    /// Parse combined stdout/stderr into a summary, (0,0) when nothing matches
    pub fn parse(&self, output: &str) -> TestSummary {
        if let Some(summary) = self
            .strict
            .captures(output)
            .and_then(|caps| counts(&caps, 2, 3))
        {
            return summary;
        }

        if let Some(summary) = self
            .loose
            .captures(output)
            .and_then(|caps| counts(&caps, 1, 2))
        {
            return summary;
        }

        TestSummary::default()
    }
}

impl Default for VerdictParser {
    fn default() -> Self {
        Self::new()
    }
}

fn counts(caps: &Captures<'_>, passed: usize, failed: usize) -> Option<TestSummary> {
    let passed = caps.get(passed)?.as_str().parse().ok()?;
    let failed = caps.get(failed)?.as_str().parse().ok()?;
    Some(TestSummary::new(passed, failed))
}
