//! Trainer-side collaborator interfaces.
//!
//! The training algorithm drives the hooks; hooks only call back into it for
//! the current timestep, to persist the model, and to reach the training
//! environment. Policy evaluation is a separate routine so hooks can be tested
//! without a real model.

use std::path::Path;

use crate::env::VecEnv;
use crate::error::Result;

/// The RL training loop that owns and drives the hooks.
///
/// Hooks borrow the trainer for the duration of each call, so implementations
/// only need shared access here.
pub trait Trainer {
    /// Timesteps collected so far (zero-based: the hook sees this plus one).
    fn num_timesteps(&self) -> u64;

    /// Serialize the model to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be written.
    fn save(&self, path: &Path) -> Result<()>;

    /// The training environment, if the trainer has one attached.
    fn env(&self) -> Option<&dyn VecEnv> {
        None
    }
}

/// Runs a policy for a number of episodes and reports per-episode rewards.
///
/// Implemented for any matching closure, so a trainer can pass its own
/// evaluation loop directly:
///
/// ```rust,ignore
/// let evaluator = |trainer: &dyn Trainer, env: &mut dyn VecEnv, n: usize, deterministic: bool| {
///     run_episodes(trainer, env, n, deterministic)
/// };
/// ```
pub trait PolicyEvaluator: Send {
    /// Evaluate the trainer's current policy on `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if an episode cannot be completed.
    fn evaluate(
        &mut self,
        trainer: &dyn Trainer,
        env: &mut dyn VecEnv,
        n_eval_episodes: usize,
        deterministic: bool,
    ) -> Result<Vec<f64>>;
}

impl<F> PolicyEvaluator for F
where
    F: FnMut(&dyn Trainer, &mut dyn VecEnv, usize, bool) -> Result<Vec<f64>> + Send,
{
    fn evaluate(
        &mut self,
        trainer: &dyn Trainer,
        env: &mut dyn VecEnv,
        n_eval_episodes: usize,
        deterministic: bool,
    ) -> Result<Vec<f64>> {
        self(trainer, env, n_eval_episodes, deterministic)
    }
}

/// A boxed [`PolicyEvaluator`] trait object.
pub type BoxedEvaluator = Box<dyn PolicyEvaluator>;
