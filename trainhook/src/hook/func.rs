//! Closure-backed hooks.

use std::fmt;

use crate::error::Result;
use crate::trainer::Trainer;

use super::base::{Hook, HookState};
use super::context::{TrainContext, read_context};

/// Boxed step closure for [`FnHook`].
pub type StepFn = Box<dyn FnMut(&TrainContext) -> bool + Send>;

/// Turns a plain closure into a [`Hook`].
///
/// The closure sees the live training context on every step (an empty one
/// before training starts) and returns `false` to stop training.
///
/// ```rust,ignore
/// let hook = FnHook::new(|ctx| ctx.get_local("diverged") != Some(&serde_json::json!(true)));
/// ```
pub struct FnHook {
    state: HookState,
    on_step: StepFn,
}

impl FnHook {
    /// Wrap `on_step`.
    pub fn new<F>(on_step: F) -> Self
    where
        F: FnMut(&TrainContext) -> bool + Send + 'static,
    {
        Self {
            state: HookState::default(),
            on_step: Box::new(on_step),
        }
    }
}

impl<F> From<F> for FnHook
where
    F: FnMut(&TrainContext) -> bool + Send + 'static,
{
    fn from(on_step: F) -> Self {
        Self::new(on_step)
    }
}

impl fmt::Debug for FnHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Hook for FnHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn on_step(&mut self, _trainer: &dyn Trainer) -> Result<bool> {
        match self.state.context() {
            Some(ctx) => Ok((self.on_step)(&read_context(ctx))),
            None => Ok((self.on_step)(&TrainContext::default())),
        }
    }
}
