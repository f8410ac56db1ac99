// Config validation
// Invalid configuration fails fast at construction with actionable errors

use crate::config::types::{EngineConfig, Result, ScoringError};
use regex::Regex;

/// Validation result with detailed errors
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validate config before any engine component is built.
/// Errors are fatal; warnings are returned for the caller to log.
pub fn validate_config(config: &EngineConfig) -> Result<ValidationResult> {
    let mut result = ValidationResult::new();

    validate_toolchain(config, &mut result);
    validate_scoring(config, &mut result);

    if !result.is_valid() {
        return Err(ScoringError::Config(format!(
            "Config validation failed:\n{}",
            result.errors.join("\n")
        )));
    }

    Ok(result)
}

fn validate_toolchain(config: &EngineConfig, result: &mut ValidationResult) {
    let toolchain = &config.toolchain;

    if toolchain.rustc.trim().is_empty() {
        result.add_error("toolchain.rustc cannot be empty".to_string());
    }

    if toolchain.edition.trim().is_empty() {
        result.add_error("toolchain.edition cannot be empty".to_string());
    } else if !["2015", "2018", "2021", "2024"].contains(&toolchain.edition.as_str()) {
        result.add_warning(format!(
            "toolchain.edition {:?} is not a known Rust edition",
            toolchain.edition
        ));
    }

    if toolchain.compile_timeout_ms == 0 {
        result.add_error("toolchain.compile_timeout_ms cannot be zero".to_string());
    }
    if toolchain.run_timeout_ms == 0 {
        result.add_error("toolchain.run_timeout_ms cannot be zero".to_string());
    }
    if toolchain.compile_timeout_ms > 300_000 {
        result.add_warning(format!(
            "toolchain.compile_timeout_ms {} exceeds five minutes",
            toolchain.compile_timeout_ms
        ));
    }

    if toolchain.output_limit_bytes == 0 {
        result.add_error("toolchain.output_limit_bytes cannot be zero".to_string());
    }

    if let Some(root) = &config.workspace_root {
        if !root.is_absolute() {
            result.add_error(format!(
                "workspace_root must be absolute path: {}",
                root.display()
            ));
        }
    }
}

fn validate_scoring(config: &EngineConfig, result: &mut ValidationResult) {
    let scoring = &config.scoring;

    for pattern in &scoring.dangerous_patterns {
        if let Err(e) = Regex::new(pattern) {
            result.add_error(format!("dangerous pattern {:?} is invalid: {}", pattern, e));
        }
    }

    if scoring.dangerous_patterns.is_empty() {
        result.add_warning("no dangerous patterns configured; safety penalty disabled".to_string());
    }

    if !scoring.safety_penalty.is_finite() || scoring.safety_penalty < 0.0 {
        result.add_error(format!(
            "scoring.safety_penalty must be a non-negative number, got {}",
            scoring.safety_penalty
        ));
    }

    for (name, value) in [
        ("concise_bonus", scoring.concise_bonus),
        ("test_bonus", scoring.test_bonus),
    ] {
        if !value.is_finite() {
            result.add_error(format!("scoring.{} must be finite", name));
        } else if value < 0.0 {
            result.add_warning(format!("scoring.{} is negative ({})", name, value));
        }
    }

    if scoring.max_length == 0 {
        result.add_warning("scoring.max_length is zero; concise bonus never applies".to_string());
    }

    if scoring.test_marker.is_empty() {
        result.add_error("scoring.test_marker cannot be empty".to_string());
    }
}
