/// Episode state machine
/// Uninitialized -> reset() -> Ready -> step() -> Ready. There is no terminal
/// state; episode length is the caller's concern.
use crate::config::types::{
    Action, EngineConfig, EpisodeState, ExecutionResult, Observation, Result, ScoringError,
    TestSummary, META_CORE_CODE, META_LAST_CODE, META_TEST_CODE,
};
use crate::config::validator::validate_config;
use crate::exec::CompileRunner;
use crate::judge::harness::{build_harness, core_program};
use crate::judge::rustc::RustcToolchain;
use crate::judge::Toolchain;
use crate::observability::audit::events;
use crate::scoring::ScoringPipeline;
use crate::verdict::{reward, VerdictParser};
use uuid::Uuid;

/// Scores one episode of code submissions. Steps take `&mut self`, so one
/// instance never has two steps in flight.
pub struct Orchestrator<T: Toolchain = RustcToolchain> {
    config: EngineConfig,
    runner: CompileRunner<T>,
    pipeline: ScoringPipeline,
    parser: VerdictParser,
    state: Option<EpisodeState>,
}

impl Orchestrator<RustcToolchain> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let toolchain = RustcToolchain::from_config(&config.toolchain);
        Self::with_toolchain(toolchain, config)
    }
}

impl<T: Toolchain> Orchestrator<T> {
    /// Build an orchestrator around any toolchain. Config errors are fatal,
    /// warnings are logged.
    pub fn with_toolchain(toolchain: T, config: EngineConfig) -> Result<Self> {
        let report = validate_config(&config)?;
        for warning in &report.warnings {
            log::warn!("config: {}", warning);
        }

        let pipeline = ScoringPipeline::from_config(&config.scoring)?;
        let runner = CompileRunner::with_toolchain(toolchain, &config)?;
        Ok(Self {
            config,
            runner,
            pipeline,
            parser: VerdictParser::new(),
            state: None,
        })
    }

    /// Replace the standard transform chain.
    pub fn with_pipeline(mut self, pipeline: ScoringPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn runner(&self) -> &CompileRunner<T> {
        &self.runner
    }

    /// Current episode, `None` before the first `reset`
    pub fn state(&self) -> Option<&EpisodeState> {
        self.state.as_ref()
    }

    /// Start a fresh episode and return the neutral observation.
    pub fn reset(&mut self) -> Observation {
        let state = EpisodeState::new(Uuid::new_v4().to_string());
        events::episode_reset(&state.episode_id);
        self.state = Some(state);

        self.pipeline.apply(Observation::neutral())
    }

    /// Decode an action from JSON and score it. Anything that is not exactly
    /// `{core_code, test_code?}` is rejected without running anything.
    pub fn step_json(&mut self, value: &serde_json::Value) -> Result<Observation> {
        let action: Action = serde_json::from_value(value.clone())
            .map_err(|e| ScoringError::InvalidAction(e.to_string()))?;
        self.step(&action)
    }

    /// Compile, optionally test, and score one action.
    pub fn step(&mut self, action: &Action) -> Result<Observation> {
        let Some(state) = self.state.as_mut() else {
            return Err(ScoringError::EpisodeNotStarted);
        };

        let core = self.runner.check(&core_program(&action.core_code))?;
        let compiles = core.success();
        if !compiles {
            events::compile_failed(&state.episode_id, core.exit_code);
        }

        let (last, summary) = if compiles && action.has_tests() {
            let tested = self
                .runner
                .run_tests(&build_harness(&action.core_code, &action.test_code))?;
            let summary = self
                .parser
                .parse(&tested.combined_output())
                .forced_for_exit(tested.exit_code);
            (tested, summary)
        } else {
            (core, TestSummary::default())
        };

        let observation = self
            .pipeline
            .apply(observe(action, last, compiles, summary));

        state.step_count += 1;
        state.last_exit_code = observation.exit_code;
        state.last_compiles = compiles;
        state.total_tests_passed = summary.passed;
        state.total_tests_failed = summary.failed;
        events::step_completed(state, &observation);

        Ok(observation)
    }
}

/// Observation for the last executed phase, carrying the base reward.
fn observe(
    action: &Action,
    last: ExecutionResult,
    compiles: bool,
    summary: TestSummary,
) -> Observation {
    let mut observation = Observation {
        stdout: last.stdout,
        stderr: last.stderr,
        exit_code: last.exit_code,
        tests_passed: summary.passed,
        tests_failed: summary.failed,
        compiles,
        reward: reward(compiles, summary.passed, summary.failed) as f64,
        ..Observation::default()
    };
    observation
        .metadata
        .insert(META_CORE_CODE.to_string(), action.core_code.clone());
    observation
        .metadata
        .insert(META_TEST_CODE.to_string(), action.test_code.clone());
    observation
        .metadata
        .insert(META_LAST_CODE.to_string(), action.combined_code());
    observation
}
