//! Drive checkpoint, evaluation and early-stopping hooks from a toy trainer.
//!
//! The "policy" improves a little on every evaluation until it reaches the
//! reward threshold, at which point the hooks stop training.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example cartpole_hooks
//! ```

#![allow(clippy::print_stdout)]

use std::cell::Cell;
use std::path::Path;

use trainhook::hook::write_context;
use trainhook::prelude::*;
use tracing_subscriber::EnvFilter;

const REWARD_THRESHOLD: f64 = 195.0;

/// Vectorized environment with observation normalization.
#[derive(Debug, Clone)]
struct CartPoleEnv {
    num_envs: usize,
    stats: NormalizationStats,
}

impl CartPoleEnv {
    fn new(num_envs: usize) -> Self {
        Self {
            num_envs,
            stats: NormalizationStats {
                obs_rms: Some(RunningMeanStd::new(4)),
                ret_rms: None,
            },
        }
    }
}

impl VecEnv for CartPoleEnv {
    fn num_envs(&self) -> usize {
        self.num_envs
    }

    fn normalization(&self) -> Option<&NormalizationStats> {
        Some(&self.stats)
    }

    fn normalization_mut(&mut self) -> Option<&mut NormalizationStats> {
        Some(&mut self.stats)
    }
}

/// Trainer that only counts timesteps and pretends to save.
struct ToyTrainer {
    timesteps: Cell<u64>,
    env: CartPoleEnv,
}

impl Trainer for ToyTrainer {
    fn num_timesteps(&self) -> u64 {
        self.timesteps.get()
    }

    fn save(&self, path: &Path) -> Result<()> {
        println!("saving model to {}", path.display());
        Ok(())
    }

    fn env(&self) -> Option<&dyn VecEnv> {
        Some(&self.env)
    }
}

impl ToyTrainer {
    fn learn(&mut self, hook: &mut dyn Hook, total_timesteps: u64) -> anyhow::Result<()> {
        let ctx = TrainContext::new()
            .with_global("algo", serde_json::json!("toy"))
            .shared();
        hook.initialize(&*self)?;
        hook.on_training_start(&ctx);

        let batch = self.env.num_envs as u64;
        'training: while self.timesteps.get() < total_timesteps {
            hook.on_rollout_start();
            for _ in 0..32 {
                let observations: Vec<Vec<f64>> = (0..self.env.num_envs)
                    .map(|i| vec![i as f64, 0.1, -0.2, 0.05])
                    .collect();
                if let Some(rms) = self.env.stats.obs_rms.as_mut() {
                    rms.update(&observations)?;
                }
                write_context(&ctx)
                    .set_local("timestep", serde_json::json!(self.timesteps.get()));

                let keep_going = hook.step(&*self)?;
                self.timesteps.set(self.timesteps.get() + batch);
                if !keep_going {
                    hook.on_rollout_end();
                    break 'training;
                }
            }
            hook.on_rollout_end();
        }

        hook.on_training_end();
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let logs = std::env::temp_dir().join("trainhook-cartpole");

    let mut round = 0_u32;
    let evaluator =
        move |_: &dyn Trainer, _: &mut dyn VecEnv, n: usize, _: bool| -> Result<Vec<f64>> {
            round += 1;
            let reward = f64::from(round).mul_add(25.0, 50.0);
            Ok((0..n).map(|i| reward + i as f64).collect())
        };

    let eval = EvaluationHook::new(
        Box::new(CartPoleEnv::new(1)),
        Box::new(evaluator),
        EvaluationConfig::new()
            .with_eval_freq(50)
            .with_log_path(logs.join("evaluations.json"))
            .with_best_model_save_path(logs.join("best")),
    )?
    .with_on_new_best(Box::new(
        StopOnThresholdHook::new(REWARD_THRESHOLD).with_verbose(1),
    ));

    let mut hooks = HookList::new(vec![
        Box::new(
            CheckpointHook::new(CheckpointConfig::new(100, logs.join("checkpoints")))?
                .with_verbose(2),
        ),
        Box::new(eval),
        Box::new(EveryNStepsHook::new(
            1_000,
            Box::new(FnHook::new(|ctx: &TrainContext| {
                println!("still training at {:?}", ctx.get_local("timestep"));
                true
            })),
        )),
        Box::new(LoggingHook::with_level(LogLevel::Debug)),
    ]);

    let mut trainer = ToyTrainer {
        timesteps: Cell::new(0),
        env: CartPoleEnv::new(4),
    };
    trainer.learn(&mut hooks, 100_000)?;

    let log = EvaluationLog::load(&logs.join("evaluations.json"))?;
    println!(
        "stopped after {} timesteps and {} evaluations",
        trainer.num_timesteps(),
        log.len()
    );
    Ok(())
}
