// ============================================================
// Layer 3 — Training History
// ============================================================
// The metrics history of a training run: four named series,
// each holding one value per completed epoch.
//
//   train_loss  — summed batch losses over training samples
//   train_acc   — fraction of training samples predicted correctly
//   val_loss    — summed batch losses over validation samples
//   val_acc     — fraction of validation samples predicted correctly
//
// Serialised as a JSON object with exactly those four keys:
//   { "train_loss": [...], "train_acc": [...],
//     "val_loss":   [...], "val_acc":   [...] }
//
// Reference: Rust Book §5 (Structs and Methods)
//            serde derive documentation

use serde::{Deserialize, Serialize};

/// Names of the four series, in the order they are reported.
pub const HISTORY_KEYS: [&str; 4] = ["train_loss", "train_acc", "val_loss", "val_acc"];

/// The four metrics measured at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Training loss (summed batch means over samples). Range: [0, ∞)
    pub train_loss: f64,

    /// Training accuracy. Range: [0.0, 1.0]
    pub train_acc: f64,

    /// Validation loss (summed batch means over samples). Range: [0, ∞)
    pub val_loss: f64,

    /// Validation accuracy. Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, val_loss, val_acc }
    }

    /// True when both losses are non-negative and both accuracies lie in [0, 1].
    pub fn in_range(&self) -> bool {
        let loss_ok = |l: f64| l >= 0.0;
        let acc_ok  = |a: f64| (0.0..=1.0).contains(&a);
        loss_ok(self.train_loss) && loss_ok(self.val_loss)
            && acc_ok(self.train_acc) && acc_ok(self.val_acc)
    }
}

/// Per-epoch metric series accumulated by the training driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub train_loss: Vec<f64>,
    pub train_acc:  Vec<f64>,
    pub val_loss:   Vec<f64>,
    pub val_acc:    Vec<f64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one epoch's values to all four series.
    pub fn push(&mut self, m: &EpochMetrics) {
        self.train_loss.push(m.train_loss);
        self.train_acc.push(m.train_acc);
        self.val_loss.push(m.val_loss);
        self.val_acc.push(m.val_acc);
    }

    /// Look a series up by its key name.
    pub fn series(&self, key: &str) -> Option<&[f64]> {
        match key {
            "train_loss" => Some(&self.train_loss),
            "train_acc"  => Some(&self.train_acc),
            "val_loss"   => Some(&self.val_loss),
            "val_acc"    => Some(&self.val_acc),
            _ => None,
        }
    }

    /// Number of recorded epochs (length of the train_loss series).
    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All four series have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.train_loss.len();
        self.train_acc.len() == n && self.val_loss.len() == n && self.val_acc.len() == n
    }

    /// Metrics of the given 1-based epoch, if recorded.
    pub fn epoch(&self, epoch: usize) -> Option<EpochMetrics> {
        let i = epoch.checked_sub(1)?;
        Some(EpochMetrics::new(
            epoch,
            *self.train_loss.get(i)?,
            *self.train_acc.get(i)?,
            *self.val_loss.get(i)?,
            *self.val_acc.get(i)?,
        ))
    }

    /// The epoch with the highest validation accuracy.
    pub fn best_epoch(&self) -> Option<EpochMetrics> {
        (1..=self.len())
            .filter_map(|e| self.epoch(e))
            .max_by(|a, b| a.val_acc.total_cmp(&b.val_acc))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> History {
        let mut h = History::new();
        h.push(&EpochMetrics::new(1, 0.9, 0.70, 0.6, 0.80));
        h.push(&EpochMetrics::new(2, 0.4, 0.88, 0.3, 0.91));
        h.push(&EpochMetrics::new(3, 0.3, 0.92, 0.35, 0.90));
        h
    }

    #[test]
    fn test_push_keeps_series_aligned() {
        let h = sample_history();
        assert!(h.is_consistent());
        assert_eq!(h.len(), 3);
        for key in HISTORY_KEYS {
            assert_eq!(h.series(key).map(|s| s.len()), Some(3), "series {key}");
        }
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(sample_history().series("test_acc").is_none());
    }

    #[test]
    fn test_serialises_with_exactly_four_keys() {
        let json  = serde_json::to_value(sample_history()).unwrap();
        let obj   = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = HISTORY_KEYS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_epoch_lookup_is_one_based() {
        let h = sample_history();
        assert!(h.epoch(0).is_none());
        assert_eq!(h.epoch(2).unwrap().val_acc, 0.91);
        assert!(h.epoch(4).is_none());
    }

    #[test]
    fn test_best_epoch_uses_val_acc() {
        assert_eq!(sample_history().best_epoch().unwrap().epoch, 2);
        assert!(History::new().best_epoch().is_none());
    }

    #[test]
    fn test_metric_ranges() {
        assert!(EpochMetrics::new(1, 0.0, 1.0, 2.5, 0.0).in_range());
        assert!(!EpochMetrics::new(1, -0.1, 0.5, 0.1, 0.5).in_range());
        assert!(!EpochMetrics::new(1, 0.1, 1.5, 0.1, 0.5).in_range());
    }
}
