// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   checkpoint.rs    — per-epoch model weights (CompactRecorder)
//                      and the run's train_config.json
//
//   metrics.rs       — metrics.csv, one row appended per epoch
//
//   history_store.rs — history.json, the four metric series
//                      (Persistable impl for History)
//
//   plots.rs         — PNG figures: learning curves,
//                      convolution previews, dataset samples
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// JSON persistence of the training history
pub mod history_store;

/// PNG rendering of curves and images
pub mod plots;

/// A fresh, empty scratch directory for a test.
#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("mnist_lab_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}
