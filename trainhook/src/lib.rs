//! Trainhook - composable hooks for reinforcement-learning training loops
//!
//! This crate provides small hook objects a trainer invokes at fixed points of
//! training (start, end, rollouts, every step) to checkpoint the model,
//! evaluate it periodically and stop early once it is good enough.
//!
//! The trainer, its environments and the policy-evaluation routine stay
//! outside the crate and are reached through the [`Trainer`], [`VecEnv`] and
//! [`PolicyEvaluator`] traits.

pub mod env;
pub mod error;
pub mod hook;
pub mod prelude;
pub mod trainer;

#[cfg(test)]
mod test_support;

pub use env::{NormalizationStats, RunningMeanStd, VecEnv, sync_envs_normalization};
pub use error::{Error, Result};
pub use trainer::{PolicyEvaluator, Trainer};
