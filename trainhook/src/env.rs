//! Environment-side collaborator interface.
//!
//! Hooks never step an environment themselves. They only need to know how many
//! parallel instances an environment runs and, when observation/return
//! normalization is in play, to copy the running statistics from the training
//! environment into the evaluation environment so both see the same scale.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A vectorized environment as seen by the hooks.
///
/// Implemented by the training framework. Only the parallel-instance count is
/// required; normalization statistics are optional and default to absent.
pub trait VecEnv: Send {
    /// Number of environment instances stepped in parallel.
    fn num_envs(&self) -> usize;

    /// Running normalization statistics, if this environment normalizes.
    fn normalization(&self) -> Option<&NormalizationStats> {
        None
    }

    /// Mutable access to the normalization statistics, if any.
    fn normalization_mut(&mut self) -> Option<&mut NormalizationStats> {
        None
    }
}

/// A boxed [`VecEnv`] trait object.
pub type BoxedVecEnv = Box<dyn VecEnv>;

/// Running mean and variance over a stream of fixed-width samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningMeanStd {
    /// Per-dimension mean.
    pub mean: Vec<f64>,
    /// Per-dimension (population) variance.
    pub var: Vec<f64>,
    /// Number of samples seen, seeded with a small epsilon.
    pub count: f64,
}

impl RunningMeanStd {
    /// Initial pseudo-count so the first update never divides by zero.
    pub const EPSILON: f64 = 1e-4;

    /// Create statistics for samples of width `dim`.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            var: vec![1.0; dim],
            count: Self::EPSILON,
        }
    }

    /// Width of the tracked samples.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Fold a batch of samples into the running statistics.
    ///
    /// An empty batch leaves the statistics untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if any row's width differs from
    /// [`dim`](Self::dim). Nothing is merged in that case.
    pub fn update(&mut self, batch: &[Vec<f64>]) -> Result<()> {
        if let Some(row) = batch.iter().find(|row| row.len() != self.dim()) {
            return Err(Error::precondition(format!(
                "sample width {} does not match running stats width {}",
                row.len(),
                self.dim()
            )));
        }
        if batch.is_empty() {
            return Ok(());
        }
        let batch_count = batch.len() as f64;
        let mut batch_mean = vec![0.0; self.dim()];
        for row in batch {
            for (acc, x) in batch_mean.iter_mut().zip(row) {
                *acc += x / batch_count;
            }
        }
        let mut batch_var = vec![0.0; self.dim()];
        for row in batch {
            for ((acc, x), m) in batch_var.iter_mut().zip(row).zip(&batch_mean) {
                *acc += (x - m).powi(2) / batch_count;
            }
        }
        self.update_from_moments(&batch_mean, &batch_var, batch_count)
    }

    /// Merge precomputed batch moments (parallel variance algorithm).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if either moment's width differs from
    /// [`dim`](Self::dim). The statistics are left untouched in that case.
    pub fn update_from_moments(
        &mut self,
        batch_mean: &[f64],
        batch_var: &[f64],
        batch_count: f64,
    ) -> Result<()> {
        if batch_mean.len() != self.dim() || batch_var.len() != self.dim() {
            return Err(Error::precondition(format!(
                "batch moments of width {}/{} do not match running stats width {}",
                batch_mean.len(),
                batch_var.len(),
                self.dim()
            )));
        }
        let tot_count = self.count + batch_count;
        let moments = batch_mean.iter().zip(batch_var);
        let running = self.mean.iter_mut().zip(&mut self.var);
        for ((mean, var), (b_mean, b_var)) in running.zip(moments) {
            let delta = b_mean - *mean;
            let m_a = *var * self.count;
            let m_b = b_var * batch_count;
            let m2 = m_a + m_b + delta.powi(2) * self.count * batch_count / tot_count;
            *mean += delta * batch_count / tot_count;
            *var = m2 / tot_count;
        }
        self.count = tot_count;
        Ok(())
    }
}

/// Normalization state carried by a normalizing environment wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Observation statistics.
    pub obs_rms: Option<RunningMeanStd>,
    /// Discounted-return statistics used to scale rewards.
    pub ret_rms: Option<RunningMeanStd>,
}

/// Copy normalization statistics from `source` into `target`.
///
/// Does nothing unless both environments carry statistics. The target gets an
/// independent copy; later updates to the source do not leak into it.
pub fn sync_envs_normalization(source: &dyn VecEnv, target: &mut dyn VecEnv) {
    if let (Some(src), Some(dst)) = (source.normalization(), target.normalization_mut()) {
        dst.clone_from(src);
        tracing::trace!(
            obs = src.obs_rms.is_some(),
            ret = src.ret_rms.is_some(),
            "Synced normalization statistics"
        );
    }
}
