//! Tracing-based logging hook.
//!
//! Provides [`LoggingHook`], which emits a structured `tracing` event for every
//! lifecycle call at a configurable level and never stops training.
//!
//! # Example
//!
//! ```rust
//! use trainhook::hook::{LogLevel, LoggingHook};
//!
//! // Default: logs at INFO level
//! let hook = LoggingHook::new();
//!
//! // Custom: logs at DEBUG level
//! let quiet = LoggingHook::with_level(LogLevel::Debug);
//! ```

use crate::error::Result;
use crate::trainer::Trainer;

use super::base::{Hook, HookState};

/// Log verbosity level for hook events.
///
/// Maps directly to `tracing` levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose).
    Trace,
    /// Debug-level logging.
    Debug,
    /// Info-level logging (default).
    #[default]
    Info,
    /// Warn-level logging.
    Warn,
}

/// Emit a log event at the specified level using `tracing` macros.
macro_rules! log_at_level {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)*),
            LogLevel::Debug => tracing::debug!($($arg)*),
            LogLevel::Info  => tracing::info!($($arg)*),
            LogLevel::Warn  => tracing::warn!($($arg)*),
        }
    };
}

/// A [`Hook`] that logs lifecycle events via `tracing`.
///
/// Step events carry the call count and timestep; they are emitted one level
/// below the configured level so a training run at INFO is not flooded.
#[derive(Debug, Clone, Default)]
pub struct LoggingHook {
    state: HookState,
    level: LogLevel,
}

impl LoggingHook {
    /// Create a logging hook with the default log level (INFO).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging hook with a custom log level.
    #[must_use]
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            state: HookState::default(),
            level,
        }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    const fn step_level(&self) -> LogLevel {
        match self.level {
            LogLevel::Trace | LogLevel::Debug => LogLevel::Trace,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Warn => LogLevel::Info,
        }
    }
}

impl Hook for LoggingHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HookState {
        &mut self.state
    }

    fn init_hook(&mut self, trainer: &dyn Trainer) -> Result<()> {
        log_at_level!(
            self.level,
            num_timesteps = trainer.num_timesteps(),
            num_envs = trainer.env().map(|env| env.num_envs()),
            "Hook initialized"
        );
        Ok(())
    }

    fn training_started(&mut self) {
        log_at_level!(self.level, "Training started");
    }

    fn on_rollout_start(&mut self) {
        log_at_level!(
            self.step_level(),
            n_calls = self.state.n_calls(),
            "Rollout started"
        );
    }

    fn on_rollout_end(&mut self) {
        log_at_level!(
            self.step_level(),
            n_calls = self.state.n_calls(),
            num_timesteps = self.state.num_timesteps(),
            "Rollout completed"
        );
    }

    fn on_training_end(&mut self) {
        log_at_level!(
            self.level,
            n_calls = self.state.n_calls(),
            num_timesteps = self.state.num_timesteps(),
            "Training completed"
        );
    }

    fn on_step(&mut self, _trainer: &dyn Trainer) -> Result<bool> {
        log_at_level!(
            self.step_level(),
            n_calls = self.state.n_calls(),
            num_timesteps = self.state.num_timesteps(),
            "Step"
        );
        Ok(true)
    }
}
