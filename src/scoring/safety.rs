/// Dangerous-pattern penalty
use crate::config::types::{Observation, Result, ScoringError, META_SAFETY_VIOLATION};
use crate::observability::audit::events;
use crate::scoring::Transform;
use regex::Regex;

/// Subtracts `penalty` once when the code matches any pattern. Patterns are
/// checked in order and only the first match is recorded.
#[derive(Debug, Clone)]
pub struct SafetyTransform {
    penalty: f64,
    patterns: Vec<Regex>,
}

impl SafetyTransform {
    pub fn new<S: AsRef<str>>(penalty: f64, patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    ScoringError::Config(format!("invalid dangerous pattern '{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { penalty, patterns })
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// First pattern matching `code`, by source text
    pub fn first_match(&self, code: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(code))
            .map(Regex::as_str)
    }
}

impl Transform for SafetyTransform {
    fn name(&self) -> &'static str {
        "safety"
    }

    fn apply(&self, mut observation: Observation) -> Observation {
        let Some(pattern) = self.first_match(observation.last_code()).map(str::to_string) else {
            return observation;
        };

        events::safety_violation(&pattern);
        observation.reward -= self.penalty;
        observation
            .metadata
            .insert(META_SAFETY_VIOLATION.to_string(), pattern);
        observation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{default_dangerous_patterns, META_LAST_CODE};

    fn observe(code: &str, reward: f64) -> Observation {
        let mut obs = Observation::neutral();
        obs.metadata
            .insert(META_LAST_CODE.to_string(), code.to_string());
        obs.reward = reward;
        obs
    }

    fn standard() -> SafetyTransform {
        SafetyTransform::new(3.0, &default_dangerous_patterns()).unwrap()
    }

    #[test]
    fn test_clean_code_untouched() {
        let obs = observe("fn add(a: i32, b: i32) -> i32 { a + b }", 6.0);
        let out = standard().apply(obs.clone());
        assert_eq!(out, obs);
        assert_eq!(out.safety_violation(), None);
    }

    #[test]
    fn test_penalty_applied_once_for_many_matches() {
        let code = "use std::process::Command;\nfn main() { Command::new(\"ls\"); unsafe { } }";
        let out = standard().apply(observe(code, 1.0));
        assert_eq!(out.reward, -2.0);
        assert_eq!(out.safety_violation(), Some("std::process::Command"));
    }

    #[test]
    fn test_pattern_order_decides_recorded_match() {
        let code = "fn main() { unsafe {} ; let _ = std::fs::remove_file(\"x\"); }";
        let out = standard().apply(observe(code, 0.0));
        assert_eq!(out.safety_violation(), Some(r"unsafe\s*\{"));

        let reversed = SafetyTransform::new(3.0, &[r"std::fs::remove_", r"unsafe\s*\{"]).unwrap();
        let out = reversed.apply(observe(code, 0.0));
        assert_eq!(out.safety_violation(), Some("std::fs::remove_"));
    }

    #[test]
    fn test_unsafe_requires_block() {
        let transform = standard();
        assert!(transform.first_match("unsafe fn raw() {}").is_none());
        assert!(transform.first_match("unsafe{ }").is_some());
        assert!(transform.first_match("unsafe \n {").is_some());
    }

    #[test]
    fn test_missing_code_is_empty() {
        let obs = Observation {
            reward: 2.0,
            ..Observation::default()
        };
        let out = standard().apply(obs.clone());
        assert_eq!(out, obs);
    }

    #[test]
    fn test_invalid_regex_reports_pattern() {
        let err = SafetyTransform::new(1.0, &["[bad"]).unwrap_err();
        assert!(err.to_string().contains("[bad"));
    }
}
