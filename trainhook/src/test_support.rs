//! Mock collaborators shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::env::{NormalizationStats, VecEnv};
use crate::error::Result;
use crate::hook::{Hook, HookState};
use crate::trainer::Trainer;

/// Shared counter for tracking how many times a hook is called.
#[derive(Debug, Default, Clone)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self(Arc::new(AtomicUsize::new(0)))
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Environment with a configurable instance count and optional stats.
#[derive(Debug, Clone)]
pub struct MockEnv {
    pub num_envs: usize,
    pub stats: Option<NormalizationStats>,
}

impl MockEnv {
    pub const fn single() -> Self {
        Self {
            num_envs: 1,
            stats: None,
        }
    }
}

impl VecEnv for MockEnv {
    fn num_envs(&self) -> usize {
        self.num_envs
    }

    fn normalization(&self) -> Option<&NormalizationStats> {
        self.stats.as_ref()
    }

    fn normalization_mut(&mut self) -> Option<&mut NormalizationStats> {
        self.stats.as_mut()
    }
}

/// Trainer that records save requests instead of serializing anything.
#[derive(Debug, Default)]
pub struct MockTrainer {
    timesteps: Cell<u64>,
    saves: RefCell<Vec<PathBuf>>,
    env: Option<MockEnv>,
    write_files: bool,
}

impl MockTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: MockEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Make `save` create a small file at the requested path.
    pub const fn writing_files(mut self) -> Self {
        self.write_files = true;
        self
    }

    pub fn set_timesteps(&self, timesteps: u64) {
        self.timesteps.set(timesteps);
    }

    pub fn saves(&self) -> Vec<PathBuf> {
        self.saves.borrow().clone()
    }
}

impl Trainer for MockTrainer {
    fn num_timesteps(&self) -> u64 {
        self.timesteps.get()
    }

    fn save(&self, path: &Path) -> Result<()> {
        if self.write_files {
            std::fs::write(path, self.timesteps.get().to_string())?;
        }
        self.saves.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn env(&self) -> Option<&dyn VecEnv> {
        let env: &dyn VecEnv = self.env.as_ref()?;
        Some(env)
    }
}

/// Observation handles for a [`RecordingHook`] that has been boxed away.
#[derive(Debug, Clone, Default)]
pub struct Tap {
    pub inits: CallCounter,
    pub starts: CallCounter,
    pub rollout_starts: CallCounter,
    pub rollout_ends: CallCounter,
    pub ends: CallCounter,
    pub timesteps: Arc<Mutex<Vec<u64>>>,
}

impl Tap {
    pub fn steps(&self) -> usize {
        self.timesteps.lock().expect("lock poisoned").len()
    }

    pub fn timesteps(&self) -> Vec<u64> {
        self.timesteps.lock().expect("lock poisoned").clone()
    }
}

/// Hook that records every call and answers with a fixed value.
#[derive(Debug)]
pub struct RecordingHook {
    state: HookState,
    tap: Tap,
    answer: bool,
}

impl RecordingHook {
    pub fn new(answer: bool) -> (Self, Tap) {
        let tap = Tap::default();
        let hook = Self {
            state: HookState::default(),
            tap: tap.clone(),
            answer,
        };
        (hook, tap)
    }
}

impl Hook for RecordingHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn init_hook(&mut self, _trainer: &dyn Trainer) -> Result<()> {
        self.tap.inits.increment();
        Ok(())
    }

    fn training_started(&mut self) {
        self.tap.starts.increment();
    }

    fn on_rollout_start(&mut self) {
        self.tap.rollout_starts.increment();
    }

    fn on_rollout_end(&mut self) {
        self.tap.rollout_ends.increment();
    }

    fn on_training_end(&mut self) {
        self.tap.ends.increment();
    }

    fn on_step(&mut self, _trainer: &dyn Trainer) -> Result<bool> {
        self.tap
            .timesteps
            .lock()
            .expect("lock poisoned")
            .push(self.state.num_timesteps());
        Ok(self.answer)
    }
}
