// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Writes per-epoch model weights with Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (.mpk.gz file) — one per epoch
//   2. latest_epoch.json            — which epoch was last saved
//   3. train_config.json            — the run's configuration
//
// File naming convention:
//   <output_dir>/
//     train_config.json
//     checkpoints/
//       model_epoch_1.mpk.gz
//       model_epoch_2.mpk.gz
//       ...
//       latest_epoch.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;

/// Writes model checkpoints and the run configuration.
pub struct CheckpointManager {
    /// Directory holding the per-epoch weight files
    dir: PathBuf,
    /// Directory holding train_config.json
    config_dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `output_dir`, creating
    /// `output_dir/checkpoints` if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let config_dir = output_dir.as_ref().to_path_buf();
        let dir        = config_dir.join("checkpoints");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir, config_dir })
    }

    /// Save model weights for a given epoch to
    /// `{dir}/model_epoch_{epoch}.mpk.gz` and update the latest pointer.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<()> {
        // Recorder adds the extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Write the run configuration as pretty JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.config_dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_dir;
    use crate::ml::model::{DenseClassifier, DenseClassifierConfig};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn model() -> DenseClassifier<TestBackend> {
        DenseClassifierConfig::new().with_hidden(4).init(&Default::default())
    }

    fn latest_epoch(dir: &Path) -> usize {
        let s = fs::read_to_string(dir.join("checkpoints").join("latest_epoch.json")).unwrap();
        serde_json::from_str(&s).unwrap()
    }

    #[test]
    fn test_no_pointer_before_save() {
        let dir = test_dir("ckpt_missing");
        CheckpointManager::new(&dir).unwrap();
        assert!(!dir.join("checkpoints").join("latest_epoch.json").exists());
    }

    #[test]
    fn test_save_updates_latest_epoch() {
        let dir = test_dir("ckpt_latest");
        let mgr = CheckpointManager::new(&dir).unwrap();
        let m   = model();
        mgr.save_model::<TestBackend, _>(&m, 1).unwrap();
        mgr.save_model::<TestBackend, _>(&m, 2).unwrap();
        assert_eq!(latest_epoch(&dir), 2);
    }

    #[test]
    fn test_saved_weights_load_back() {
        let dir   = test_dir("ckpt_load");
        let mgr   = CheckpointManager::new(&dir).unwrap();
        let saved = model();
        mgr.save_model::<TestBackend, _>(&saved, 1).unwrap();

        let record = CompactRecorder::new()
            .load(dir.join("checkpoints").join("model_epoch_1"), &Default::default())
            .unwrap();
        let loaded = model().load_record(record);

        let a = saved.output.weight.val().into_data().convert::<f32>().to_vec::<f32>().unwrap();
        let b = loaded.output.weight.val().into_data().convert::<f32>().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2, "{x} vs {y}");
        }
    }

    #[test]
    fn test_config_written_as_json() {
        let dir = test_dir("ckpt_config");
        let mgr = CheckpointManager::new(&dir).unwrap();
        let cfg = TrainConfig { epochs: 3, ..TrainConfig::default() };
        mgr.save_config(&cfg).unwrap();

        let json   = fs::read_to_string(dir.join("train_config.json")).unwrap();
        let parsed: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.epochs, 3);
    }
}
