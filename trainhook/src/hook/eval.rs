//! Periodic policy evaluation with best-model tracking.
//!
//! Every `eval_freq` calls the [`EvaluationHook`] runs the policy on a separate
//! single-instance environment, optionally appends the episode rewards to an
//! on-disk [`EvaluationLog`], and, when the mean reward strictly beats the best
//! seen so far, saves the model and fires its child hook. Pair it with a
//! [`StopOnThresholdHook`](super::StopOnThresholdHook) child to stop training
//! once the policy is good enough.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::env::{BoxedVecEnv, sync_envs_normalization};
use crate::error::{Error, Result};
use crate::trainer::{BoxedEvaluator, Trainer};

use super::base::{BoxedHook, Hook, HookState, ParentLink, ParentView};
use super::event::EventHook;

/// How and how often to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Episodes per evaluation.
    pub n_eval_episodes: usize,
    /// Evaluate every `eval_freq` calls of the hook.
    pub eval_freq: u64,
    /// File the evaluation history is rewritten to after each evaluation.
    pub log_path: Option<PathBuf>,
    /// Folder the best model is saved to.
    pub best_model_save_path: Option<PathBuf>,
    /// Use deterministic actions during evaluation.
    pub deterministic: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            n_eval_episodes: 5,
            eval_freq: 10_000,
            log_path: None,
            best_model_save_path: None,
            deterministic: true,
        }
    }
}

impl EvaluationConfig {
    /// Create a config with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of episodes per evaluation.
    #[must_use]
    pub const fn with_n_eval_episodes(mut self, n: usize) -> Self {
        self.n_eval_episodes = n;
        self
    }

    /// Set the evaluation frequency in calls.
    #[must_use]
    pub const fn with_eval_freq(mut self, freq: u64) -> Self {
        self.eval_freq = freq;
        self
    }

    /// Persist the evaluation history to `path`.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Save each new best model under `dir`.
    #[must_use]
    pub fn with_best_model_save_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.best_model_save_path = Some(dir.into());
        self
    }

    /// Choose deterministic or stochastic actions.
    #[must_use]
    pub const fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    /// Check the frequencies are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if `eval_freq` or `n_eval_episodes` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.eval_freq == 0 {
            return Err(Error::precondition("evaluation eval_freq must be positive"));
        }
        if self.n_eval_episodes == 0 {
            return Err(Error::precondition(
                "evaluation n_eval_episodes must be positive",
            ));
        }
        Ok(())
    }
}

/// History of evaluations: parallel timestep and reward sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationLog {
    /// Timestep of each evaluation.
    pub timesteps: Vec<u64>,
    /// Per-episode rewards of each evaluation.
    pub results: Vec<Vec<f64>>,
}

impl EvaluationLog {
    /// Append one evaluation.
    pub fn record(&mut self, timestep: u64, rewards: Vec<f64>) {
        self.timesteps.push(timestep);
        self.results.push(rewards);
    }

    /// Number of evaluations recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    /// Overwrite `path` with the full history as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Read a history previously written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

/// Reward bookkeeping shared between an evaluation hook and its child.
#[derive(Debug)]
pub struct EvalProgress {
    best_mean_reward: AtomicU64,
    last_mean_reward: AtomicU64,
}

impl Default for EvalProgress {
    fn default() -> Self {
        Self {
            best_mean_reward: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            last_mean_reward: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
        }
    }
}

impl EvalProgress {
    /// Best mean reward so far; negative infinity before the first evaluation.
    #[must_use]
    pub fn best_mean_reward(&self) -> f64 {
        f64::from_bits(self.best_mean_reward.load(Ordering::SeqCst))
    }

    /// Mean reward of the latest evaluation.
    #[must_use]
    pub fn last_mean_reward(&self) -> f64 {
        f64::from_bits(self.last_mean_reward.load(Ordering::SeqCst))
    }

    fn set_best(&self, reward: f64) {
        self.best_mean_reward.store(reward.to_bits(), Ordering::SeqCst);
    }

    fn set_last(&self, reward: f64) {
        self.last_mean_reward.store(reward.to_bits(), Ordering::SeqCst);
    }
}

impl ParentView for EvalProgress {
    fn kind(&self) -> &'static str {
        "EvaluationHook"
    }

    fn best_mean_reward(&self) -> Option<f64> {
        Some(Self::best_mean_reward(self))
    }
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Evaluates the agent periodically and fires its child on a new best.
pub struct EvaluationHook {
    event: EventHook,
    eval_env: BoxedVecEnv,
    evaluator: BoxedEvaluator,
    config: EvaluationConfig,
    progress: Arc<EvalProgress>,
    log: EvaluationLog,
}

impl std::fmt::Debug for EvaluationHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationHook")
            .field("event", &self.event)
            .field("config", &self.config)
            .field("progress", &self.progress)
            .field("evaluations", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl EvaluationHook {
    /// Create an evaluation hook. Verbosity defaults to 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if `eval_env` runs more than one
    /// instance or the config is invalid.
    pub fn new(
        eval_env: BoxedVecEnv,
        evaluator: BoxedEvaluator,
        config: EvaluationConfig,
    ) -> Result<Self> {
        if eval_env.num_envs() != 1 {
            return Err(Error::precondition(format!(
                "evaluation needs exactly one environment, got {}",
                eval_env.num_envs()
            )));
        }
        config.validate()?;
        let progress = Arc::new(EvalProgress::default());
        let link: ParentLink = Arc::<EvalProgress>::clone(&progress);
        Ok(Self {
            event: EventHook::with_link(None, link).with_verbose(1),
            eval_env,
            evaluator,
            config,
            progress,
            log: EvaluationLog::default(),
        })
    }

    /// Fire `hook` whenever a new best mean reward is reached.
    #[must_use]
    pub fn with_on_new_best(mut self, hook: BoxedHook) -> Self {
        let verbose = self.event.state().verbose();
        let link: ParentLink = Arc::<EvalProgress>::clone(&self.progress);
        self.event = EventHook::with_link(Some(hook), link).with_verbose(verbose);
        self
    }

    /// Set the verbosity level. Above 0 every evaluation is logged.
    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.event.state_mut().set_verbose(verbose);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Best mean reward so far.
    #[must_use]
    pub fn best_mean_reward(&self) -> f64 {
        self.progress.best_mean_reward()
    }

    /// Mean reward of the latest evaluation.
    #[must_use]
    pub fn last_mean_reward(&self) -> f64 {
        self.progress.last_mean_reward()
    }

    /// Evaluations recorded so far (only kept when a log path is set).
    #[must_use]
    pub const fn evaluations(&self) -> &EvaluationLog {
        &self.log
    }

    /// The child fired on a new best, if any.
    #[must_use]
    pub fn child(&self) -> Option<&dyn Hook> {
        self.event.child()
    }

    fn evaluate(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        if let Some(train_env) = trainer.env() {
            sync_envs_normalization(train_env, self.eval_env.as_mut());
        }

        let episode_rewards = self.evaluator.evaluate(
            trainer,
            self.eval_env.as_mut(),
            self.config.n_eval_episodes,
            self.config.deterministic,
        )?;
        if episode_rewards.is_empty() {
            return Err(Error::evaluation("evaluator returned no episode rewards"));
        }

        let num_timesteps = self.event.state().num_timesteps();
        let (mean_reward, std_reward) = mean_std(&episode_rewards);

        if let Some(log_path) = &self.config.log_path {
            self.log.record(num_timesteps, episode_rewards);
            self.log.save(log_path)?;
        }

        self.progress.set_last(mean_reward);
        let verbose = self.event.state().verbose();
        if verbose > 0 {
            tracing::info!(
                num_timesteps,
                mean_reward,
                std_reward,
                "Eval num_timesteps={num_timesteps}, episode_reward={mean_reward:.2} +/- {std_reward:.2}"
            );
        }

        if mean_reward > self.progress.best_mean_reward() {
            if verbose > 0 {
                tracing::info!(mean_reward, "New best mean reward!");
            }
            if let Some(dir) = &self.config.best_model_save_path {
                trainer.save(&dir.join("best_model"))?;
            }
            self.progress.set_best(mean_reward);
            return self.event.fire_child(trainer);
        }
        Ok(true)
    }
}

impl Hook for EvaluationHook {
    fn state(&self) -> &HookState {
        self.event.state()
    }

    fn state_mut(&mut self) -> &mut HookState {
        self.event.state_mut()
    }

    fn init_hook(&mut self, trainer: &dyn Trainer) -> Result<()> {
        if let Some(dir) = &self.config.best_model_save_path {
            fs::create_dir_all(dir)?;
        }
        if let Some(parent) = self
            .config
            .log_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        self.event.init_child(trainer)
    }

    fn training_started(&mut self) {
        self.event.start_child();
    }

    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        if self.event.state().n_calls() % self.config.eval_freq == 0 {
            return self.evaluate(trainer);
        }
        Ok(true)
    }
}
