use crate::config::types::{Observation, ScoringConfig};
use crate::scoring::Transform;

/// Conciseness and test-presence bonuses. The two are independent and add up.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityTransform {
    pub concise_bonus: f64,
    pub test_bonus: f64,
    pub max_length: usize,
    pub test_marker: String,
}

impl QualityTransform {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            concise_bonus: config.concise_bonus,
            test_bonus: config.test_bonus,
            max_length: config.max_length,
            test_marker: config.test_marker.clone(),
        }
    }

    /// Non-empty and at most `max_length` characters once trimmed
    pub fn is_concise(&self, code: &str) -> bool {
        let len = code.trim().chars().count();
        len > 0 && len <= self.max_length
    }

    pub fn has_tests(&self, code: &str) -> bool {
        !self.test_marker.is_empty() && code.contains(&self.test_marker)
    }
}

impl Default for QualityTransform {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl Transform for QualityTransform {
    fn name(&self) -> &'static str {
        "quality"
    }

    fn apply(&self, mut observation: Observation) -> Observation {
        let code = observation.last_code();
        let mut bonus = 0.0;
        if self.is_concise(code) {
            bonus += self.concise_bonus;
        }
        if self.has_tests(code) {
            bonus += self.test_bonus;
        }
        observation.reward += bonus;
        observation
    }
}
