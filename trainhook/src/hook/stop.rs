//! Early stopping on a reward threshold.

use crate::error::{Error, Result};
use crate::trainer::Trainer;

use super::base::{Hook, HookState};

/// Stops training once the parent evaluation reaches `reward_threshold`.
///
/// Must be the new-best child of an [`EvaluationHook`](super::EvaluationHook);
/// anywhere else its first `step` fails with a precondition error.
#[derive(Debug)]
pub struct StopOnThresholdHook {
    state: HookState,
    reward_threshold: f64,
}

impl StopOnThresholdHook {
    /// Create a hook stopping at `reward_threshold` mean episode reward.
    #[must_use]
    pub fn new(reward_threshold: f64) -> Self {
        Self {
            state: HookState::default(),
            reward_threshold,
        }
    }

    /// Set the verbosity level. Above 0 the stop decision is logged.
    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.state.set_verbose(verbose);
        self
    }

    /// Minimum mean reward that ends training.
    #[must_use]
    pub const fn reward_threshold(&self) -> f64 {
        self.reward_threshold
    }
}

impl Hook for StopOnThresholdHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn on_step(&mut self, _trainer: &dyn Trainer) -> Result<bool> {
        let parent = self.state.parent().ok_or_else(|| {
            Error::precondition("StopOnThresholdHook must be used with an EvaluationHook")
        })?;
        let best_mean_reward = parent.best_mean_reward().ok_or_else(|| {
            Error::precondition(format!(
                "StopOnThresholdHook must be used with an EvaluationHook, not {}",
                parent.kind()
            ))
        })?;

        let continue_training = best_mean_reward < self.reward_threshold;
        if self.state.verbose() > 0 && !continue_training {
            tracing::info!(
                best_mean_reward,
                reward_threshold = self.reward_threshold,
                "Stopping training because the mean reward {best_mean_reward:.2} is above the threshold {}",
                self.reward_threshold
            );
        }
        Ok(continue_training)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::env::VecEnv;
    use crate::hook::{EvaluationConfig, EvaluationHook, EveryNStepsHook};
    use crate::test_support::{MockEnv, MockTrainer};

    fn eval_with_rewards(rewards: Vec<f64>, threshold: f64) -> EvaluationHook {
        let mut queue = rewards.into_iter();
        EvaluationHook::new(
            Box::new(MockEnv::single()),
            Box::new(
                move |_: &dyn Trainer, _: &mut dyn VecEnv, _: usize, _: bool| -> Result<Vec<f64>> {
                    Ok(queue.next().into_iter().collect())
                },
            ),
            EvaluationConfig::new().with_eval_freq(1),
        )
        .unwrap()
        .with_on_new_best(Box::new(StopOnThresholdHook::new(threshold).with_verbose(1)))
    }

    #[test]
    fn standalone_use_is_a_precondition_failure() {
        let trainer = MockTrainer::new();
        let mut hook = StopOnThresholdHook::new(10.0);
        let err = hook.step(&trainer).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn non_evaluation_parent_is_a_precondition_failure() {
        let trainer = MockTrainer::new();
        let mut every = EveryNStepsHook::new(1, Box::new(StopOnThresholdHook::new(1.0)));
        let err = every.step(&trainer).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("EveryNStepsHook"));
    }

    #[test]
    fn continues_below_threshold() {
        let trainer = MockTrainer::new();
        let mut eval = eval_with_rewards(vec![1.0, 5.0], 10.0);
        assert!(eval.step(&trainer).unwrap());
        assert!(eval.step(&trainer).unwrap());
    }

    #[test]
    fn stops_once_threshold_reached() {
        let trainer = MockTrainer::new();
        let mut eval = eval_with_rewards(vec![4.0, 10.0], 10.0);
        assert!(eval.step(&trainer).unwrap());
        // reaching the threshold exactly stops training
        assert!(!eval.step(&trainer).unwrap());
    }
}
