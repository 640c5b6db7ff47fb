//! Training-loop hooks.
//!
//! This module provides the [`Hook`] trait and a set of composable hooks a
//! trainer invokes at fixed points of training:
//!
//! - **Composition**: [`HookList`] fans out to several hooks, [`EventHook`]
//!   wraps a child that fires on an event
//! - **Checkpointing**: [`CheckpointHook`] saves the model periodically
//! - **Evaluation**: [`EvaluationHook`] evaluates the policy and tracks the best model
//! - **Early stopping**: [`StopOnThresholdHook`] as the child of an evaluation
//! - **Scheduling**: [`EveryNStepsHook`] fires a child every N timesteps
//! - **Adapters**: [`FnHook`] for closures, [`LoggingHook`] for tracing output
//!
//! # Example
//!
//! ```rust,ignore
//! use trainhook::hook::*;
//!
//! let eval = EvaluationHook::new(eval_env, evaluator, EvaluationConfig::new().with_eval_freq(500))?
//!     .with_on_new_best(Box::new(StopOnThresholdHook::new(195.0)));
//!
//! let mut hooks = HookList::new(vec![
//!     Box::new(CheckpointHook::new(CheckpointConfig::new(1000, "./logs"))?),
//!     Box::new(eval),
//! ]);
//! hooks.initialize(&trainer)?;
//! ```

mod base;
mod checkpoint;
mod context;
mod eval;
mod event;
mod every_n;
mod func;
mod list;
mod logging;
mod stop;

pub use base::{BoxedHook, Hook, HookState, ParentLink, ParentView};
pub use checkpoint::{CheckpointConfig, CheckpointHook};
pub use context::{SharedTrainContext, TrainContext, read_context, write_context};
pub use eval::{EvalProgress, EvaluationConfig, EvaluationHook, EvaluationLog};
pub use event::EventHook;
pub use every_n::EveryNStepsHook;
pub use func::{FnHook, StepFn};
pub use list::HookList;
pub use logging::{LogLevel, LoggingHook};
pub use stop::StopOnThresholdHook;
