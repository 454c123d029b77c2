// ============================================================
// Layer 3 — Image Domain Type
// ============================================================
// A single-channel image stored row-major as f32 intensities,
// with an optional class label. This is what the plotting
// layer draws; tensors are converted to it at the boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width:  usize,
    pub height: usize,
    /// Row-major pixel values, `width * height` of them
    pub pixels: Vec<f32>,
    pub label:  Option<usize>,
}

impl Image {
    /// Build an image from a flat row-major buffer.
    ///
    /// # Panics
    /// Panics if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixel buffer of {} values does not match {}x{}",
            pixels.len(),
            width,
            height
        );
        Self { width, height, pixels, label: None }
    }

    /// Build an image from a fixed-size 2D array (rows of columns).
    pub fn from_rows<const W: usize, const H: usize>(rows: &[[f32; W]; H]) -> Self {
        let pixels = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(W, H, pixels)
    }

    pub fn with_label(mut self, label: usize) -> Self {
        self.label = Some(label);
        self
    }

    /// Pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.pixels[y * self.width + x]
    }

    pub fn min(&self) -> f32 {
        self.pixels.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.pixels.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// The (min, max) range of this image alone.
    pub fn range(&self) -> (f32, f32) {
        (self.min(), self.max())
    }

    /// Value mapped into [0, 1] against a given (min, max) range.
    /// A flat range maps everything to 0.
    pub fn normalized_at(&self, x: usize, y: usize, (lo, hi): (f32, f32)) -> f32 {
        let span = hi - lo;
        if span <= f32::EPSILON {
            return 0.0;
        }
        ((self.get(x, y) - lo) / span).clamp(0.0, 1.0)
    }
}

/// Shared (min, max) over a set of images, used to draw them on one scale.
pub fn joint_range(images: &[Image]) -> (f32, f32) {
    images.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), im| {
        (lo.min(im.min()), hi.max(im.max()))
    })
}
