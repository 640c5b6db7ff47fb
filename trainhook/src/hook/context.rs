//! Shared training context handed to hooks at training start.
//!
//! Provides [`TrainContext`], the trainer's local and global variables as
//! JSON values. The trainer keeps mutating the same [`SharedTrainContext`]
//! while training runs, and hooks read it live instead of taking a snapshot.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

/// A shared, live handle to a [`TrainContext`].
pub type SharedTrainContext = Arc<RwLock<TrainContext>>;

/// Variables exposed by the trainer to its hooks.
///
/// # Example
///
/// ```rust
/// use trainhook::hook::TrainContext;
///
/// let mut ctx = TrainContext::new();
/// ctx.set_local("n_steps", serde_json::json!(2048));
/// assert_eq!(ctx.get_local("n_steps"), Some(&serde_json::json!(2048)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrainContext {
    /// Variables local to the current training call.
    locals: HashMap<String, Value>,
    /// Variables global to the trainer.
    globals: HashMap<String, Value>,
}

impl TrainContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap this context in a shared handle.
    #[must_use]
    pub fn shared(self) -> SharedTrainContext {
        Arc::new(RwLock::new(self))
    }

    /// Set a local variable.
    #[must_use]
    pub fn with_local(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_local(key, value);
        self
    }

    /// Set a global variable.
    #[must_use]
    pub fn with_global(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_global(key, value);
        self
    }

    /// Get a reference to the locals map.
    #[must_use]
    pub const fn locals(&self) -> &HashMap<String, Value> {
        &self.locals
    }

    /// Get a reference to the globals map.
    #[must_use]
    pub const fn globals(&self) -> &HashMap<String, Value> {
        &self.globals
    }

    /// Get a local variable.
    #[must_use]
    pub fn get_local(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }

    /// Get a global variable.
    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&Value> {
        self.globals.get(key)
    }

    /// Insert or overwrite a local variable.
    pub fn set_local(&mut self, key: impl Into<String>, value: Value) {
        self.locals.insert(key.into(), value);
    }

    /// Insert or overwrite a global variable.
    pub fn set_global(&mut self, key: impl Into<String>, value: Value) {
        self.globals.insert(key.into(), value);
    }

    /// Remove a local variable.
    pub fn remove_local(&mut self, key: &str) -> Option<Value> {
        self.locals.remove(key)
    }

    /// Clear both maps.
    pub fn clear(&mut self) {
        self.locals.clear();
        self.globals.clear();
    }
}

/// Read-lock a shared context, recovering from a poisoned lock.
pub fn read_context(ctx: &SharedTrainContext) -> RwLockReadGuard<'_, TrainContext> {
    ctx.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write-lock a shared context, recovering from a poisoned lock.
pub fn write_context(ctx: &SharedTrainContext) -> RwLockWriteGuard<'_, TrainContext> {
    ctx.write().unwrap_or_else(PoisonError::into_inner)
}
