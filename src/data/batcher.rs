// ============================================================
// Layer 4 — MNIST Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<MnistItem>
// into device tensors.
//
// How batching works here:
//   Input:  Vec of N MnistItems, each a 28×28 grid of 0..255
//   Output: MnistBatch with images [N, 1, 28, 28] in [0, 1]
//           and targets [N]
//
//   All pixels are flattened into one Vec row by row, then
//   the 1D tensor is reshaped to the 4D image batch.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    prelude::*,
};

/// Side length of an MNIST image in pixels.
pub const IMAGE_SIDE: usize = 28;

/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Maximum raw pixel intensity in the dataset.
const PIXEL_MAX: f32 = 255.0;

// ─── MnistBatch ───────────────────────────────────────────────────────────────
/// A batch of labelled images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct MnistBatch<B: Backend> {
    /// Pixel intensities — shape: [batch_size, 1, 28, 28]
    pub images: Tensor<B, 4>,

    /// Class labels 0..=9 — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatch<B> {
    /// Number of samples in this batch
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── MnistBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<MnistItem, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistItem>) -> MnistBatch<B> {
        let batch_size = items.len();

        // Row-major flatten of every image, scaled into [0, 1]
        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.image.iter().flatten().map(|&p| p / PIXEL_MAX))
            .collect();

        let labels: Vec<i32> = items.iter().map(|item| item.label as i32).collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, 1, IMAGE_SIDE, IMAGE_SIDE]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        MnistBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn item(label: u8, fill: f32) -> MnistItem {
        MnistItem { image: [[fill; IMAGE_SIDE]; IMAGE_SIDE], label }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = MnistBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![item(1, 0.0), item(2, 0.0), item(3, 0.0)]);

        assert_eq!(batch.images.dims(), [3, 1, IMAGE_SIDE, IMAGE_SIDE]);
        assert_eq!(batch.targets.dims(), [3]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_pixels_are_scaled_to_unit_range() {
        let batcher = MnistBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![item(0, 255.0), item(0, 51.0)]);

        let max: f32 = batch.images.clone().max().into_scalar().elem();
        let min: f32 = batch.images.min().into_scalar().elem();
        assert!((max - 1.0).abs() < 1e-6);
        assert!((min - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_targets_keep_item_order() {
        let batcher = MnistBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![item(7, 0.0), item(2, 0.0), item(9, 0.0)]);

        let labels = batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(labels, vec![7, 2, 9]);
    }
}
