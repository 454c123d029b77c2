// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The plotting and application layers program against these
// traits rather than concrete dataset or file types:
//   - MnistDataset implements ImageSource
//   - Vec<Image> implements ImageSource (handy in tests)
//   - History implements Persistable (JSON on disk)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use anyhow::Result;
use crate::domain::image::Image;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Anything that can hand out labelled images by index.
pub trait ImageSource {
    /// The image at `index`, or None when out of range.
    fn image(&self, index: usize) -> Option<Image>;

    /// Number of images available.
    fn count(&self) -> usize;

    /// The first `n` images (fewer if the source is smaller).
    fn first(&self, n: usize) -> Vec<Image> {
        (0..n.min(self.count())).filter_map(|i| self.image(i)).collect()
    }
}

impl ImageSource for Vec<Image> {
    fn image(&self, index: usize) -> Option<Image> {
        self.get(index).cloned()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
pub trait Persistable: Sized {
    /// Save this component's state to the given path
    fn save(&self, path: &Path) -> Result<()>;

    /// Load a component's state from the given path.
    fn load(path: &Path) -> Result<Self>;
}
