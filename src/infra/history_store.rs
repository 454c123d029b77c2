// ============================================================
// Layer 6 — History Persistence
// ============================================================
// Stores a History as pretty JSON so the `plot` command can
// redraw learning curves without retraining.

use anyhow::{ensure, Context, Result};
use std::{fs, path::Path};

use crate::domain::{history::History, traits::Persistable};

impl Persistable for History {
    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write history to '{}'", path.display()))?;
        tracing::debug!("Saved history ({} epochs) to '{}'", self.len(), path.display());
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read history from '{}'", path.display()))?;
        let history: History = serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid history file", path.display()))?;
        ensure!(
            history.is_consistent(),
            "history in '{}' has series of different lengths",
            path.display()
        );
        Ok(history)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::EpochMetrics;
    use crate::infra::test_dir;

    #[test]
    fn test_saved_history_loads_back() {
        let path = test_dir("history_roundtrip").join("history.json");
        let mut h = History::new();
        h.push(&EpochMetrics::new(1, 0.5, 0.8, 0.4, 0.85));

        h.save(&path).unwrap();
        assert_eq!(History::load(&path).unwrap(), h);
    }

    #[test]
    fn test_ragged_history_is_rejected() {
        let path = test_dir("history_ragged").join("history.json");
        fs::write(
            &path,
            r#"{"train_loss":[1.0,0.5],"train_acc":[0.5],"val_loss":[1.0],"val_acc":[0.4]}"#,
        )
        .unwrap();
        assert!(History::load(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = test_dir("history_missing").join("nope.json");
        assert!(History::load(&path).is_err());
    }
}
