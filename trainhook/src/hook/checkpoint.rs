//! Periodic model checkpoints.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::trainer::Trainer;

use super::base::{Hook, HookState};

/// Where and how often to checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Save every `save_freq` calls of the hook.
    pub save_freq: u64,
    /// Folder the checkpoints are written to.
    pub save_path: PathBuf,
    /// Common prefix of the checkpoint names.
    pub name_prefix: String,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            save_freq: 10_000,
            save_path: PathBuf::from("checkpoints"),
            name_prefix: "rl_model".to_owned(),
        }
    }
}

impl CheckpointConfig {
    /// Create a config saving every `save_freq` calls into `save_path`.
    #[must_use]
    pub fn new(save_freq: u64, save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_freq,
            save_path: save_path.into(),
            ..Self::default()
        }
    }

    /// Set the checkpoint name prefix.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Check the frequency is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if `save_freq` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.save_freq == 0 {
            return Err(Error::precondition("checkpoint save_freq must be positive"));
        }
        Ok(())
    }

    /// Path of the checkpoint written at `num_timesteps`.
    #[must_use]
    pub fn checkpoint_path(&self, num_timesteps: u64) -> PathBuf {
        self.save_path
            .join(format!("{}_{num_timesteps}_steps", self.name_prefix))
    }
}

/// Saves the model every `save_freq` calls. Never stops training.
#[derive(Debug)]
pub struct CheckpointHook {
    state: HookState,
    config: CheckpointConfig,
}

impl CheckpointHook {
    /// Create a checkpoint hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if the config is invalid.
    pub fn new(config: CheckpointConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: HookState::default(),
            config,
        })
    }

    /// Set the verbosity level. Above 1 each save is logged.
    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.state.set_verbose(verbose);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Folder the checkpoints are written to.
    #[must_use]
    pub fn save_path(&self) -> &Path {
        &self.config.save_path
    }
}

impl Hook for CheckpointHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn init_hook(&mut self, _trainer: &dyn Trainer) -> Result<()> {
        std::fs::create_dir_all(&self.config.save_path)?;
        Ok(())
    }

    fn on_step(&mut self, trainer: &dyn Trainer) -> Result<bool> {
        if self.state.n_calls() % self.config.save_freq == 0 {
            let path = self.config.checkpoint_path(self.state.num_timesteps());
            trainer.save(&path)?;
            if self.state.verbose() > 1 {
                tracing::info!(
                    path = %path.display(),
                    num_timesteps = self.state.num_timesteps(),
                    "Saving model checkpoint"
                );
            }
        }
        Ok(true)
    }
}
