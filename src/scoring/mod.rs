//! Reward shaping
//!
//! An ordered chain of transforms, each taking the observation by value and
//! returning the adjusted one. Transforms read the code under evaluation from
//! the `last_code` metadata entry and never fail.

pub mod quality;
pub mod safety;

use crate::config::types::{Observation, Result, ScoringConfig};

pub use quality::QualityTransform;
pub use safety::SafetyTransform;

/// One reward-shaping stage
pub trait Transform: Send + Sync {
    /// Stable name for logs
    fn name(&self) -> &'static str;

    fn apply(&self, observation: Observation) -> Observation;
}

/// Transforms applied in insertion order
#[derive(Default)]
pub struct ScoringPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl ScoringPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard chain: safety penalty first, then quality bonuses.
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        let safety = SafetyTransform::new(config.safety_penalty, &config.dangerous_patterns)?;
        let quality = QualityTransform::from_config(config);
        Ok(Self::new().with(safety).with(quality))
    }

    pub fn push(&mut self, transform: impl Transform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.push(transform);
        self
    }

    pub fn apply(&self, observation: Observation) -> Observation {
        self.transforms.iter().fold(observation, |obs, transform| {
            let before = obs.reward;
            let obs = transform.apply(obs);
            if obs.reward != before {
                log::debug!(
                    "{} adjusted reward {} -> {}",
                    transform.name(),
                    before,
                    obs.reward
                );
            }
            obs
        })
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}
