//! Core hook trait for training-loop callbacks.
//!
//! A [`Hook`] is driven by the trainer through a fixed lifecycle:
//!
//! 1. **`initialize`**: once, before training, binds the hook to the trainer
//! 2. **`on_training_start`**: hands over the live [`SharedTrainContext`]
//! 3. **Rollout loop** (repeats):
//!    - `on_rollout_start`
//!    - **`step`** after every environment step; `Ok(false)` stops training
//!    - `on_rollout_end`
//! 4. **`on_training_end`**
//!
//! The driver methods (`initialize`, `on_training_start`, `step`) do the shared
//! bookkeeping in [`HookState`] and then call the extension points
//! (`init_hook`, `training_started`, `on_step`). Implementors override the
//! extension points and leave the drivers alone.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::trainer::Trainer;

use super::context::SharedTrainContext;

/// A boxed [`Hook`] trait object.
pub type BoxedHook = Box<dyn Hook>;

/// A shared read-only view of a parent hook.
pub type ParentLink = Arc<dyn ParentView>;

/// What an event hook exposes to the child it wraps.
pub trait ParentView: Send + Sync + fmt::Debug {
    /// Short name of the parent hook kind, used in error messages.
    fn kind(&self) -> &'static str;

    /// Best mean evaluation reward seen so far.
    ///
    /// Only evaluation parents track rewards; everything else returns `None`.
    fn best_mean_reward(&self) -> Option<f64> {
        None
    }
}

/// Bookkeeping shared by every hook.
#[derive(Debug, Clone, Default)]
pub struct HookState {
    /// Number of times `step` has been called.
    n_calls: u64,
    /// Trainer timesteps as of the last `step` call (one-based).
    num_timesteps: u64,
    /// Verbosity: 0 quiet, 1 info, 2 debug.
    verbose: u8,
    /// Whether `initialize` has run.
    initialized: bool,
    /// Live trainer variables, set at training start.
    context: Option<SharedTrainContext>,
    /// Set when this hook is wrapped by an event hook.
    parent: Option<ParentLink>,
}

impl HookState {
    /// Create a new state with the given verbosity.
    #[must_use]
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Number of `step` calls so far.
    #[must_use]
    pub const fn n_calls(&self) -> u64 {
        self.n_calls
    }

    /// Trainer timesteps as seen by the last `step` call.
    #[must_use]
    pub const fn num_timesteps(&self) -> u64 {
        self.num_timesteps
    }

    /// Verbosity level.
    #[must_use]
    pub const fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Update the verbosity level.
    pub const fn set_verbose(&mut self, verbose: u8) {
        self.verbose = verbose;
    }

    /// Whether `initialize` has been called.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The live training context, once training has started.
    #[must_use]
    pub const fn context(&self) -> Option<&SharedTrainContext> {
        self.context.as_ref()
    }

    /// The parent link, if this hook is wrapped by an event hook.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Attach this hook to a parent. A later call replaces the previous link.
    pub fn set_parent(&mut self, parent: ParentLink) {
        self.parent = Some(parent);
    }

    fn bind(&mut self) {
        self.initialized = true;
    }

    fn attach_context(&mut self, ctx: &SharedTrainContext) {
        self.context = Some(Arc::clone(ctx));
    }

    fn advance(&mut self, trainer_timesteps: u64) {
        self.n_calls += 1;
        // trainer timesteps start at zero
        self.num_timesteps = trainer_timesteps + 1;
    }
}

/// A unit invoked at fixed points of a training loop.
///
/// Only [`on_step`](Self::on_step) and the state accessors are required.
///
/// # Object Safety
///
/// This trait is object-safe and is normally used as [`BoxedHook`].
pub trait Hook: Send {
    /// Shared bookkeeping.
    fn state(&self) -> &HookState;

    /// Mutable shared bookkeeping.
    fn state_mut(&mut self) -> &mut HookState;

    /// Called on every `step`, after the counters are updated.
    ///
    /// Return `Ok(false)` to abort training after this call.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the training run.
    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool>;

    /// Extension point run at the end of [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the hook cannot prepare itself (e.g. create folders).
    fn init_hook(&mut self, _trainer: &dyn Trainer) -> Result<()> {
        Ok(())
    }

    /// Extension point run at the end of [`on_training_start`](Self::on_training_start).
    fn training_started(&mut self) {}

    /// Called before each rollout.
    fn on_rollout_start(&mut self) {}

    /// Called after each rollout.
    fn on_rollout_end(&mut self) {}

    /// Called once training is over.
    fn on_training_end(&mut self) {}

    /// Bind the hook to `trainer`. Called once before any `step`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`init_hook`](Self::init_hook).
    fn initialize(&mut self, trainer: &dyn Trainer) -> Result<()> {
        self.state_mut().bind();
        self.init_hook(trainer)
    }

    /// Store the live training context and notify the hook.
    fn on_training_start(&mut self, ctx: &SharedTrainContext) {
        self.state_mut().attach_context(ctx);
        self.training_started();
    }

    /// Advance the counters and run [`on_step`](Self::on_step).
    ///
    /// # Errors
    ///
    /// Propagates errors from [`on_step`](Self::on_step).
    fn step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        self.state_mut().advance(trainer.num_timesteps());
        self.on_step(trainer)
    }
}

impl fmt::Debug for dyn Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("n_calls", &self.state().n_calls())
            .field("num_timesteps", &self.state().num_timesteps())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hook::context::TrainContext;
    use crate::test_support::{CallCounter, MockTrainer};

    /// A hook that counts calls to each extension point.
    struct CountingHook {
        state: HookState,
        init: CallCounter,
        started: CallCounter,
        steps: CallCounter,
        answer: bool,
    }

    impl CountingHook {
        fn new(answer: bool) -> Self {
            Self {
                state: HookState::default(),
                init: CallCounter::new(),
                started: CallCounter::new(),
                steps: CallCounter::new(),
                answer,
            }
        }
    }

    impl Hook for CountingHook {
        fn state(&self) -> &HookState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut HookState {
            &mut self.state
        }

        fn init_hook(&mut self, _trainer: &dyn Trainer) -> Result<()> {
            self.init.increment();
            Ok(())
        }

        fn training_started(&mut self) {
            self.started.increment();
        }

        fn on_step(&mut self, _trainer: &dyn Trainer) -> Result<bool> {
            self.steps.increment();
            Ok(self.answer)
        }
    }

    #[derive(Debug)]
    struct Named;

    impl ParentView for Named {
        fn kind(&self) -> &'static str {
            "named"
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn initialize_binds_and_calls_extension() {
            let trainer = MockTrainer::new();
            let mut hook = CountingHook::new(true);
            assert!(!hook.state().is_initialized());

            hook.initialize(&trainer).unwrap();

            assert!(hook.state().is_initialized());
            assert_eq!(hook.init.count(), 1);
        }

        #[test]
        fn initialize_twice_rebinds_without_error() {
            let trainer = MockTrainer::new();
            let mut hook = CountingHook::new(true);
            hook.initialize(&trainer).unwrap();
            hook.initialize(&trainer).unwrap();
            assert_eq!(hook.init.count(), 2);
        }

        #[test]
        fn training_start_keeps_a_live_reference() {
            let mut hook = CountingHook::new(true);
            let ctx = TrainContext::new().shared();
            hook.on_training_start(&ctx);
            assert_eq!(hook.started.count(), 1);

            crate::hook::context::write_context(&ctx).set_local("rollout", serde_json::json!(4));

            let seen = hook.state().context().unwrap();
            assert!(Arc::ptr_eq(seen, &ctx));
            assert_eq!(
                crate::hook::context::read_context(seen).get_local("rollout"),
                Some(&serde_json::json!(4))
            );
        }

        #[test]
        fn default_extension_points_are_noops() {
            let mut hook = CountingHook::new(true);
            hook.on_rollout_start();
            hook.on_rollout_end();
            hook.on_training_end();
            assert_eq!(hook.steps.count(), 0);
        }
    }

    mod step {
        use super::*;

        #[test]
        fn step_advances_counters() {
            let trainer = MockTrainer::new();
            let mut hook = CountingHook::new(true);

            trainer.set_timesteps(41);
            assert!(hook.step(&trainer).unwrap());

            assert_eq!(hook.state().n_calls(), 1);
            assert_eq!(hook.state().num_timesteps(), 42);
            assert_eq!(hook.steps.count(), 1);
        }

        #[test]
        fn step_returns_on_step_result() {
            let trainer = MockTrainer::new();
            let mut hook = CountingHook::new(false);
            assert!(!hook.step(&trainer).unwrap());
        }

        #[test]
        fn n_calls_accumulate() {
            let trainer = MockTrainer::new();
            let mut hook = CountingHook::new(true);
            for _ in 0..5 {
                hook.step(&trainer).unwrap();
            }
            assert_eq!(hook.state().n_calls(), 5);
        }
    }

    mod parent {
        use super::*;

        #[test]
        fn set_parent_overwrites_previous_link() {
            let mut state = HookState::new(1);
            assert!(state.parent().is_none());
            state.set_parent(Arc::new(Named));
            state.set_parent(Arc::new(Named));
            assert_eq!(state.parent().unwrap().kind(), "named");
            assert!(state.parent().unwrap().best_mean_reward().is_none());
        }

        #[test]
        fn object_safety_boxed() {
            let hook: BoxedHook = Box::new(CountingHook::new(true));
            assert!(format!("{hook:?}").contains("n_calls"));
        }
    }
}
