// ============================================================
// Layer 2 — Plotting Use Cases
// ============================================================
// The three figure-only workflows:
//
//   CurvesUseCase  — history.json           → learning curves
//   FiltersUseCase — kernel + training set  → convolution preview
//   SamplesUseCase — train or test split    → strip of digits
//
// None of these train anything; the two dataset-backed ones
// download MNIST on first use like the train command does.

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::data::mnist::load_datasets;
use crate::domain::{history::History, kernel::Kernel, traits::{ImageSource, Persistable}};
use crate::infra::plots::{display_dataset, plot_convolution, plot_results};
use crate::ml::convolution::filter_images;

/// Names of the ten MNIST classes, indexed by label.
pub const DIGIT_CLASSES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Most images `SamplesUseCase` will draw in one row.
pub const MAX_SAMPLES: usize = 100;

/// Number of training images shown in a convolution preview.
pub const FILTER_PREVIEW_COUNT: usize = 5;

// ─── CurvesUseCase ────────────────────────────────────────────────────────────
pub struct CurvesUseCase {
    pub history_path: PathBuf,
    pub out:          PathBuf,
}

impl CurvesUseCase {
    pub fn execute(&self) -> Result<History> {
        let history = History::load(&self.history_path)?;
        ensure!(!history.is_empty(), "'{}' holds no epochs", self.history_path.display());
        plot_results(&history, &self.out)?;
        Ok(history)
    }
}

// ─── FiltersUseCase ───────────────────────────────────────────────────────────
pub struct FiltersUseCase {
    pub kernel: Kernel,
    pub title:  String,
    pub out:    PathBuf,
}

impl FiltersUseCase {
    pub fn execute(&self) -> Result<()> {
        let (train_set, _) = load_datasets();
        self.render(&*train_set)
    }

    /// Filter the first few images of `source` and draw the preview.
    pub fn render(&self, source: &dyn ImageSource) -> Result<()> {
        let originals = source.first(FILTER_PREVIEW_COUNT);
        ensure!(!originals.is_empty(), "no images to filter");

        tracing::info!("Applying kernel {} to {} images", self.kernel, originals.len());
        let filtered = filter_images(&self.kernel, &originals)?;

        plot_convolution(&originals, &filtered, &self.kernel.to_image(), &self.title, &self.out)
    }
}

// ─── SamplesUseCase ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

pub struct SamplesUseCase {
    pub split:  Split,
    pub count:  usize,
    pub titled: bool,
    pub out:    PathBuf,
}

impl SamplesUseCase {
    pub fn execute(&self) -> Result<()> {
        let (train_set, test_set) = load_datasets();
        let source = match self.split {
            Split::Train => train_set,
            Split::Test  => test_set,
        };
        self.render(&*source)
    }

    pub fn render(&self, source: &dyn ImageSource) -> Result<()> {
        ensure!(
            (1..=MAX_SAMPLES).contains(&self.count),
            "sample count must be between 1 and {MAX_SAMPLES}, got {}",
            self.count
        );
        let images  = source.first(self.count);
        let classes = self.titled.then_some(&DIGIT_CLASSES[..]);
        display_dataset(&images, classes, &self.out)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::Image;
    use crate::infra::test_dir;

    #[test]
    fn test_curves_reject_empty_history() {
        let dir  = test_dir("curves_empty");
        let path = dir.join("history.json");
        History::new().save(&path).unwrap();

        let uc = CurvesUseCase { history_path: path, out: dir.join("curves.png") };
        assert!(uc.execute().is_err());
    }

    #[test]
    fn test_curves_report_missing_history() {
        let dir = test_dir("curves_missing");
        let uc  = CurvesUseCase { history_path: dir.join("none.json"), out: dir.join("c.png") };
        assert!(uc.execute().is_err());
    }

    #[test]
    fn test_filters_need_images() {
        let dir = test_dir("filters_empty");
        let uc  = FiltersUseCase {
            kernel: Kernel::identity(),
            title:  String::new(),
            out:    dir.join("f.png"),
        };
        let empty: Vec<Image> = Vec::new();
        assert!(uc.render(&empty).is_err());
    }

    #[test]
    fn test_samples_need_positive_count() {
        let dir = test_dir("samples_zero");
        let uc  = SamplesUseCase { split: Split::Train, count: 0, titled: false, out: dir.join("s.png") };
        let images = vec![Image::new(2, 2, vec![0.0; 4])];
        assert!(uc.render(&images).is_err());
    }

    #[test]
    fn test_samples_count_is_capped() {
        let dir = test_dir("samples_cap");
        let uc  = SamplesUseCase {
            split:  Split::Train,
            count:  MAX_SAMPLES + 1,
            titled: false,
            out:    dir.join("s.png"),
        };
        let images = vec![Image::new(2, 2, vec![0.0; 4]); MAX_SAMPLES + 1];
        assert!(uc.render(&images).is_err());
        assert!(!dir.join("s.png").exists());
    }

    #[test]
    fn test_digit_classes_cover_labels() {
        assert_eq!(DIGIT_CLASSES.len(), 10);
        assert_eq!(DIGIT_CLASSES[7], "7");
    }
}
