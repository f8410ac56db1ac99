use crate::config::presets::EnginePresets;
use crate::config::types::{Action, EngineConfig};
use crate::config::validator::validate_config;
use crate::core::Orchestrator;
use crate::exec::CompileRunner;
use crate::safety::workspace::WorkspaceManager;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile, test and score Rust snippets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the engine config comes from; defaults when neither is given.
#[derive(Args, Debug, Default, Clone)]
struct ConfigSource {
    /// JSON config file
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    config: Option<PathBuf>,
    /// Named preset (default, strict, lenient)
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,
}

impl ConfigSource {
    fn load(&self) -> Result<EngineConfig> {
        let config = match (&self.config, &self.preset) {
            (Some(path), _) => EngineConfig::load(path)?,
            (None, Some(id)) => EnginePresets::new().resolve(id)?,
            (None, None) => EngineConfig::default(),
        };
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an episode and score one submission
    Step {
        /// File holding the core code
        #[arg(long, value_name = "FILE")]
        core: PathBuf,
        /// File holding test functions
        #[arg(long, value_name = "FILE")]
        tests: Option<PathBuf>,
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Compile and run a snippet, wrapping it in `fn main` when needed
    Run {
        /// File holding the snippet
        #[arg(long, value_name = "FILE")]
        code: PathBuf,
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Validate and print the effective configuration
    CheckConfig {
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Remove scratch directories left behind by killed runs
    Cleanup {
        /// Only remove directories older than this many seconds
        #[arg(long, default_value_t = 3600)]
        max_age_secs: u64,
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Check that the configured rustc is installed
    CheckDeps {
        #[command(flatten)]
        source: ConfigSource,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let output = execute(cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute(command: Commands) -> Result<serde_json::Value> {
    match command {
        Commands::Step {
            core,
            tests,
            source,
        } => {
            let core_code = read_source(&core)?;
            let test_code = match tests {
                Some(path) => read_source(&path)?,
                None => String::new(),
            };

            let mut orchestrator = Orchestrator::new(source.load()?)?;
            orchestrator.reset();
            let observation = orchestrator.step(&Action::new(core_code, test_code))?;
            Ok(json!({
                "observation": observation,
                "state": orchestrator.state(),
            }))
        }
        Commands::Run { code, source } => {
            let snippet = read_source(&code)?;
            let config = source.load()?;
            validate_config(&config)?;

            let result = CompileRunner::from_config(&config)?.run(&snippet)?;
            Ok(serde_json::to_value(result)?)
        }
        Commands::CheckConfig { source } => {
            let config = source.load()?;
            let report = validate_config(&config)?;
            Ok(json!({
                "valid": report.valid,
                "warnings": report.warnings,
                "presets": preset_summaries(source.preset.as_deref()),
                "config": config,
            }))
        }
        Commands::Cleanup {
            max_age_secs,
            source,
        } => {
            let config = source.load()?;
            let manager = WorkspaceManager::new(config.runtime_root_dir())?;
            let removed = manager.cleanup_old_workspaces(Duration::from_secs(max_age_secs))?;
            Ok(json!({
                "base_dir": manager.base_dir(),
                "removed": removed,
            }))
        }
        Commands::CheckDeps { source } => {
            let config = source.load()?;
            let rustc = &config.toolchain.rustc;
            let version = rustc_version(rustc)
                .with_context(|| format!("{} is not usable", rustc))?;
            Ok(json!({
                "rustc": rustc,
                "version": version,
                "edition": config.toolchain.edition,
            }))
        }
    }
}

/// Built-in presets with their descriptions, marking the selected one.
fn preset_summaries(selected: Option<&str>) -> Vec<serde_json::Value> {
    let presets = EnginePresets::new();
    presets
        .list_ids()
        .iter()
        .filter_map(|id| presets.get(id))
        .map(|preset| {
            json!({
                "id": preset.id,
                "description": preset.description,
                "selected": selected == Some(preset.id.as_str()),
            })
        })
        .collect()
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn rustc_version(rustc: &str) -> Result<String> {
    let output = std::process::Command::new(rustc).arg("--version").output()?;
    if !output.status.success() {
        anyhow::bail!("--version exited with {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
