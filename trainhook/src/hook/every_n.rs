//! Trigger a child hook every `n_steps` timesteps.

use std::sync::Arc;

use crate::error::Result;
use crate::trainer::Trainer;

use super::base::{BoxedHook, Hook, HookState};
use super::event::{EventHook, EventLink};

/// Fires its child once at least `n_steps` timesteps passed since the last trigger.
///
/// Counts trainer timesteps, not calls, so it stays on schedule when the
/// trainer steps several environments per call.
#[derive(Debug)]
pub struct EveryNStepsHook {
    event: EventHook,
    n_steps: u64,
    last_time_trigger: u64,
}

impl EveryNStepsHook {
    /// Fire `hook` every `n_steps` timesteps.
    #[must_use]
    pub fn new(n_steps: u64, hook: BoxedHook) -> Self {
        Self {
            event: EventHook::with_link(Some(hook), Arc::new(EventLink("EveryNStepsHook"))),
            n_steps,
            last_time_trigger: 0,
        }
    }

    /// Timestep of the last trigger (0 before the first one).
    #[must_use]
    pub const fn last_time_trigger(&self) -> u64 {
        self.last_time_trigger
    }

    /// The wrapped child.
    #[must_use]
    pub fn child(&self) -> Option<&dyn Hook> {
        self.event.child()
    }
}

impl Hook for EveryNStepsHook {
    fn state(&self) -> &HookState {
        self.event.state()
    }

    fn state_mut(&mut self) -> &mut HookState {
        self.event.state_mut()
    }

    fn init_hook(&mut self, trainer: &dyn Trainer) -> Result<()> {
        self.event.init_child(trainer)
    }

    fn training_started(&mut self) {
        self.event.start_child();
    }

    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        let num_timesteps = self.event.state().num_timesteps();
        if num_timesteps.saturating_sub(self.last_time_trigger) >= self.n_steps {
            self.last_time_trigger = num_timesteps;
            return self.event.fire_child(trainer);
        }
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hook::context::TrainContext;
    use crate::test_support::{MockTrainer, RecordingHook};

    #[test]
    fn fires_on_interval_with_one_timestep_per_call() {
        let trainer = MockTrainer::new();
        let (child, tap) = RecordingHook::new(true);
        let mut hook = EveryNStepsHook::new(5, Box::new(child));

        for t in 0..20 {
            trainer.set_timesteps(t);
            assert!(hook.step(&trainer).unwrap());
        }

        assert_eq!(tap.timesteps(), vec![5, 10, 15, 20]);
        assert_eq!(hook.last_time_trigger(), 20);
    }

    #[test]
    fn baseline_resets_to_trigger_timestep() {
        let trainer = MockTrainer::new();
        let (child, tap) = RecordingHook::new(true);
        let mut hook = EveryNStepsHook::new(100, Box::new(child));

        // trainer advances 64 timesteps per call (e.g. 64 parallel envs)
        for call in 0..6 {
            trainer.set_timesteps(call * 64);
            hook.step(&trainer).unwrap();
        }

        // timesteps seen: 1, 65, 129, 193, 257, 321
        assert_eq!(tap.timesteps(), vec![129, 257]);
    }

    #[test]
    fn propagates_child_stop() {
        let trainer = MockTrainer::new();
        let (child, _) = RecordingHook::new(false);
        let mut hook = EveryNStepsHook::new(1, Box::new(child));
        assert!(!hook.step(&trainer).unwrap());
    }

    #[test]
    fn initialize_reaches_child() {
        let trainer = MockTrainer::new();
        let (child, tap) = RecordingHook::new(true);
        let mut hook = EveryNStepsHook::new(3, Box::new(child));
        hook.initialize(&trainer).unwrap();
        assert_eq!(tap.inits.count(), 1);
        assert_eq!(
            hook.child().unwrap().state().parent().unwrap().kind(),
            "EveryNStepsHook"
        );
    }

    #[test]
    fn training_start_hands_the_same_context_to_the_child() {
        let (child, tap) = RecordingHook::new(true);
        let mut hook = EveryNStepsHook::new(3, Box::new(child));
        let ctx = TrainContext::new().shared();

        hook.on_training_start(&ctx);

        assert_eq!(tap.starts.count(), 1);
        let child_ctx = hook.child().unwrap().state().context().unwrap();
        assert!(Arc::ptr_eq(child_ctx, &ctx));
    }
}
