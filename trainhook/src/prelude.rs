//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trainhook::prelude::*;
//! ```

pub use crate::env::{
    BoxedVecEnv, NormalizationStats, RunningMeanStd, VecEnv, sync_envs_normalization,
};
pub use crate::error::{Error, Result};
pub use crate::hook::{
    BoxedHook, CheckpointConfig, CheckpointHook, EvaluationConfig, EvaluationHook, EvaluationLog,
    EventHook, EveryNStepsHook, FnHook, Hook, HookList, HookState, LogLevel, LoggingHook,
    SharedTrainContext, StopOnThresholdHook, TrainContext,
};
pub use crate::trainer::{BoxedEvaluator, PolicyEvaluator, Trainer};
