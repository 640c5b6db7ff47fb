//! Event hooks: hooks that trigger a wrapped child hook.

use std::sync::Arc;

use crate::error::Result;
use crate::trainer::Trainer;

use super::base::{BoxedHook, Hook, HookState, ParentLink, ParentView};

/// Parent view for event hooks that carry no extra data.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventLink(pub(crate) &'static str);

impl ParentView for EventLink {
    fn kind(&self) -> &'static str {
        self.0
    }
}

/// A hook that owns an optional child and fires it when an event occurs.
///
/// On its own it fires the child on every `step`. The evaluation and
/// every-n-steps hooks embed an `EventHook` and decide themselves when to call
/// [`fire_child`](Self::fire_child).
///
/// Initialization and the training-start context are propagated to the child.
/// Rollout and training-end events are not; the child only runs through the
/// parent.
#[derive(Debug)]
pub struct EventHook {
    state: HookState,
    child: Option<BoxedHook>,
}

impl EventHook {
    /// Wrap `child`, making this hook its parent.
    #[must_use]
    pub fn new(child: Option<BoxedHook>) -> Self {
        Self::with_link(child, Arc::new(EventLink("EventHook")))
    }

    /// Wrap `child`, exposing `link` to it as the parent view.
    #[must_use]
    pub fn with_link(child: Option<BoxedHook>, link: ParentLink) -> Self {
        let child = child.map(|mut child| {
            child.state_mut().set_parent(link);
            child
        });
        Self {
            state: HookState::default(),
            child,
        }
    }

    /// Set the verbosity level.
    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.state.set_verbose(verbose);
        self
    }

    /// The wrapped child, if any.
    #[must_use]
    pub fn child(&self) -> Option<&dyn Hook> {
        self.child.as_deref()
    }

    /// Step the child and return its answer; `Ok(true)` without a child.
    ///
    /// # Errors
    ///
    /// Propagates the child's error.
    pub fn fire_child(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        match self.child.as_mut() {
            Some(child) => child.step(trainer),
            None => Ok(true),
        }
    }

    pub(crate) fn init_child(&mut self, trainer: &dyn Trainer) -> Result<()> {
        match self.child.as_mut() {
            Some(child) => child.initialize(trainer),
            None => Ok(()),
        }
    }

    pub(crate) fn start_child(&mut self) {
        if let (Some(child), Some(ctx)) = (self.child.as_mut(), self.state.context()) {
            child.on_training_start(ctx);
        }
    }
}

impl Hook for EventHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn init_hook(&mut self, trainer: &dyn Trainer) -> Result<()> {
        self.init_child(trainer)
    }

    fn training_started(&mut self) {
        self.start_child();
    }

    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        self.fire_child(trainer)
    }
}
