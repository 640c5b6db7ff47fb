//! Ordered composition of hooks.

use crate::error::Result;
use crate::trainer::Trainer;

use super::base::{BoxedHook, Hook, HookState};

/// A hook that fans every lifecycle call out to its children, in order.
///
/// `step` runs every child even after one of them asked to stop; training
/// continues only if all of them answered `true`.
#[derive(Debug, Default)]
pub struct HookList {
    state: HookState,
    hooks: Vec<BoxedHook>,
}

impl HookList {
    /// Create a list from hooks that fire in the given order.
    #[must_use]
    pub fn new(hooks: Vec<BoxedHook>) -> Self {
        Self {
            state: HookState::default(),
            hooks,
        }
    }

    /// Number of child hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the list has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Iterate over the children in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Hook> {
        self.hooks.iter().map(|hook| &**hook)
    }
}

impl From<Vec<BoxedHook>> for HookList {
    fn from(hooks: Vec<BoxedHook>) -> Self {
        Self::new(hooks)
    }
}

impl Hook for HookList {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn init_hook(&mut self, trainer: &dyn Trainer) -> Result<()> {
        for hook in &mut self.hooks {
            hook.initialize(trainer)?;
        }
        Ok(())
    }

    fn training_started(&mut self) {
        if let Some(ctx) = self.state.context() {
            for hook in &mut self.hooks {
                hook.on_training_start(ctx);
            }
        }
    }

    fn on_rollout_start(&mut self) {
        for hook in &mut self.hooks {
            hook.on_rollout_start();
        }
    }

    fn on_rollout_end(&mut self) {
        for hook in &mut self.hooks {
            hook.on_rollout_end();
        }
    }

    fn on_training_end(&mut self) {
        for hook in &mut self.hooks {
            hook.on_training_end();
        }
    }

    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        let mut continue_training = true;
        for hook in &mut self.hooks {
            // Every child runs; one `false` is enough to stop.
            continue_training = hook.step(trainer)? && continue_training;
        }
        Ok(continue_training)
    }
}
