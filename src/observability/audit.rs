/// Structured engine audit events
/// Every event is rendered as one JSON record and emitted through the `log`
/// facade at a level derived from its severity.
use log::{info, log_enabled, warn, Level};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

use crate::config::types::{format_limit, EpisodeState, Observation};

/// Event severity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventSeverity {
    High,
    Medium,
    Low,
}

/// Types of engine events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineEventType {
    EpisodeReset,
    StepCompleted,
    CompileFailed,
    TimeoutEnforced,
    SafetyViolation,
}

impl EngineEventType {
    /// Get the default severity for this event type
    pub fn default_severity(&self) -> EventSeverity {
        match self {
            EngineEventType::EpisodeReset => EventSeverity::Low,
            EngineEventType::StepCompleted => EventSeverity::Low,
            EngineEventType::CompileFailed => EventSeverity::Low,
            EngineEventType::TimeoutEnforced => EventSeverity::Medium,
            EngineEventType::SafetyViolation => EventSeverity::High,
        }
    }
}

/// Individual engine event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub event_type: EngineEventType,
    pub severity: EventSeverity,
    pub timestamp: SystemTime,
    pub details: String,
    pub episode_id: Option<String>,
    pub step: Option<u64>,
    pub reward: Option<f64>,
}

impl EngineEvent {
    /// Create a new event with default severity
    pub fn new(event_type: EngineEventType, details: String) -> Self {
        Self {
            event_type,
            severity: event_type.default_severity(),
            timestamp: SystemTime::now(),
            details,
            episode_id: None,
            step: None,
            reward: None,
        }
    }

    pub fn with_episode(mut self, episode_id: &str) -> Self {
        self.episode_id = Some(episode_id.to_string());
        self
    }

    pub fn with_step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = Some(reward);
        self
    }

    /// JSON record for this event
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "timestamp": self.timestamp
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            "event_type": self.event_type,
            "severity": self.severity,
            "details": self.details,
            "episode_id": self.episode_id,
            "step": self.step,
            "reward": self.reward,
            "process_id": std::process::id(),
        })
    }
}

/// Emit an event through the `log` facade
pub fn log_event(event: EngineEvent) {
    let level = match event.severity {
        EventSeverity::High => Level::Warn,
        EventSeverity::Medium => Level::Info,
        EventSeverity::Low => Level::Debug,
    };
    if !log_enabled!(target: "rustscore::events", level) {
        return;
    }
    let record = event.to_record();
    match level {
        Level::Warn => warn!(target: "rustscore::events", "{}", record),
        Level::Info => info!(target: "rustscore::events", "{}", record),
        _ => log::debug!(target: "rustscore::events", "{}", record),
    }
}

/// Convenience functions for common engine events
pub mod events {
    use super::*;

    pub fn episode_reset(episode_id: &str) {
        log_event(
            EngineEvent::new(
                EngineEventType::EpisodeReset,
                "episode state reinitialised".to_string(),
            )
            .with_episode(episode_id),
        );
    }

    pub fn step_completed(state: &EpisodeState, observation: &Observation) {
        let details = format!(
            "compiles={} exit_code={} passed={} failed={}",
            observation.compiles,
            observation.exit_code,
            observation.tests_passed,
            observation.tests_failed
        );
        log_event(
            EngineEvent::new(EngineEventType::StepCompleted, details)
                .with_episode(&state.episode_id)
                .with_step(state.step_count)
                .with_reward(observation.reward),
        );
    }

    pub fn compile_failed(episode_id: &str, exit_code: i32) {
        log_event(
            EngineEvent::new(
                EngineEventType::CompileFailed,
                format!("core code failed to compile (exit code {})", exit_code),
            )
            .with_episode(episode_id),
        );
    }

    pub fn timeout_enforced(label: &str, limit: Duration) {
        log_event(EngineEvent::new(
            EngineEventType::TimeoutEnforced,
            format!("{} killed after {}", label, format_limit(limit)),
        ));
    }

    pub fn safety_violation(pattern: &str) {
        log_event(EngineEvent::new(
            EngineEventType::SafetyViolation,
            format!("dangerous pattern matched: {}", pattern),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(
            EngineEventType::SafetyViolation.default_severity(),
            EventSeverity::High
        );
        assert_eq!(
            EngineEventType::TimeoutEnforced.default_severity(),
            EventSeverity::Medium
        );
        assert_eq!(
            EngineEventType::StepCompleted.default_severity(),
            EventSeverity::Low
        );
    }

    #[test]
    fn test_record_fields() {
        let event = EngineEvent::new(EngineEventType::StepCompleted, "ok".to_string())
            .with_episode("ep-1")
            .with_step(3)
            .with_reward(9.5);
        let record = event.to_record();
        assert_eq!(record["event_type"], "StepCompleted");
        assert_eq!(record["severity"], "Low");
        assert_eq!(record["episode_id"], "ep-1");
        assert_eq!(record["step"], 3);
        assert_eq!(record["reward"], 9.5);
    }
}
