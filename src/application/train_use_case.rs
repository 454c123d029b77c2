// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run:
//
//   Step 1: Prepare the output directory   (Layer 6 - infra)
//   Step 2: Save the run configuration     (Layer 6 - infra)
//   Step 3: Load MNIST, build the model,
//           train and validate per epoch   (Layer 5 - ml)
//   Step 4: Save history.json              (Layer 6 - infra)
//   Step 5: Render curves.png              (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::mnist::LoaderConfig;
use crate::domain::{history::History, traits::Persistable};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger, plots::plot_results};
use crate::ml::{
    loss::LossKind,
    model::ModelKind,
    trainer::{run_training, OptimizerKind, TrainOptions},
};

/// Where the tensors live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    /// GPU when one is available, otherwise the best adapter wgpu finds
    #[default]
    Auto,
    Gpu,
    Cpu,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, saved next to the
// results as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub output_dir:   String,
    pub batch_size:   usize,
    pub epochs:       usize,
    pub lr:           f64,
    pub num_workers:  usize,
    pub seed:         u64,
    pub model:        ModelKind,
    pub hidden:       usize,
    pub conv_filters: usize,
    pub optimizer:    OptimizerKind,
    pub loss:         LossKind,
    pub device:       DeviceKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            output_dir:   "runs".to_string(),
            batch_size:   128,
            epochs:       10,
            lr:           0.01,
            num_workers:  1,
            seed:         42,
            model:        ModelKind::Dense,
            hidden:       100,
            conv_filters: 9,
            optimizer:    OptimizerKind::Adam,
            loss:         LossKind::Nll,
            device:       DeviceKind::Auto,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would train on empty batches or record
    /// an empty history.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.lr > 0.0 && self.lr.is_finite(), "lr must be a positive number, got {}", self.lr);
        Ok(())
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            batch_size:  self.batch_size,
            num_workers: self.num_workers,
            seed:        self.seed,
        }
    }

    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            epochs:    self.epochs,
            lr:        self.lr,
            loss:      self.loss,
            optimizer: self.optimizer,
        }
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join("history.json")
    }

    pub fn curves_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join("curves.png")
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<History> {
        let cfg = &self.config;
        cfg.validate()?;
        tracing::info!(
            "Training {:?} model for {} epochs (batch {}, lr {}, {:?}, {:?} loss)",
            cfg.model, cfg.epochs, cfg.batch_size, cfg.lr, cfg.optimizer, cfg.loss,
        );

        // ── Step 1–2: Output directory and config ─────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.output_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.output_dir)?;

        // ── Step 3: Training loop (Layer 5) ───────────────────────────────────
        let history = run_training(cfg, &ckpt_manager, &metrics)?;

        // ── Step 4–5: Persist and plot ────────────────────────────────────────
        history.save(&cfg.history_path())?;
        plot_results(&history, &cfg.curves_path())?;

        tracing::info!(
            "Results in '{}' (history.json, metrics.csv, curves.png, checkpoints/)",
            cfg.output_dir
        );
        Ok(history)
    }
}
