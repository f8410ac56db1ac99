/// Engine presets
///
/// Named, immutable configurations selectable from the CLI. Each preset is a
/// complete `EngineConfig`; `--config` and `--preset` are mutually exclusive.
use crate::config::types::{EngineConfig, Result, ScoringError};
use std::collections::HashMap;

/// Preset metadata plus the configuration it expands to
#[derive(Debug, Clone)]
pub struct EnginePreset {
    /// Preset ID (e.g., "default", "strict")
    pub id: String,
    /// Human-readable description
    pub description: String,
    pub config: EngineConfig,
}

/// Preset registry
pub struct EnginePresets {
    presets: HashMap<String, EnginePreset>,
}

impl EnginePresets {
    /// Create new preset registry with the built-in presets
    pub fn new() -> Self {
        let mut presets = Self {
            presets: HashMap::new(),
        };

        presets.register_default();
        presets.register_strict();
        presets.register_lenient();

        presets
    }

    fn register(&mut self, preset: EnginePreset) {
        self.presets.insert(preset.id.clone(), preset);
    }

    fn register_default(&mut self) {
        self.register(EnginePreset {
            id: "default".to_string(),
            description: "edition 2021, 10s compile and run bounds, penalty 3".to_string(),
            config: EngineConfig::default(),
        });
    }

    /// Tighter bounds and a heavier penalty for large training sweeps.
    fn register_strict(&mut self) {
        let mut config = EngineConfig::default();
        config.toolchain.compile_timeout_ms = 5_000;
        config.toolchain.run_timeout_ms = 2_000;
        config.toolchain.output_limit_bytes = 64 * 1024;
        config.scoring.safety_penalty = 5.0;
        config.scoring.dangerous_patterns.extend([
            r"std::env::set_var".to_string(),
            r"std::ptr::".to_string(),
        ]);

        self.register(EnginePreset {
            id: "strict".to_string(),
            description: "short bounds, 64 KiB output cap, penalty 5, extra patterns".to_string(),
            config,
        });
    }

    /// Generous bounds for slow hosts; shaping unchanged.
    fn register_lenient(&mut self) {
        let mut config = EngineConfig::default();
        config.toolchain.compile_timeout_ms = 60_000;
        config.toolchain.run_timeout_ms = 30_000;

        self.register(EnginePreset {
            id: "lenient".to_string(),
            description: "60s compile and 30s run bounds".to_string(),
            config,
        });
    }

    pub fn get(&self, id: &str) -> Option<&EnginePreset> {
        self.presets.get(id)
    }

    /// Config for `id`, or a configuration error naming the known presets.
    pub fn resolve(&self, id: &str) -> Result<EngineConfig> {
        self.get(id).map(|p| p.config.clone()).ok_or_else(|| {
            ScoringError::Config(format!(
                "unknown preset {:?} (available: {})",
                id,
                self.list_ids().join(", ")
            ))
        })
    }

    /// Sorted preset IDs
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.presets.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for EnginePresets {
    fn default() -> Self {
        Self::new()
    }
}
