// ============================================================
// Layer 4 — MNIST Loader
// ============================================================
// Downloads (on first use) the MNIST train/test pair through
// burn's vision datasets and wraps them in DataLoaders.
//
//   train loader — shuffled, built on the autodiff backend
//   test loader  — in order, built on the inner backend so
//                  validation carries no autodiff overhead
//
// Batch sizes: every batch holds `batch_size` items except
// possibly the last. Burn gives each loader worker its own slice
// of the dataset, and every slice ends in a short batch, so at
// most one background worker is used.

use std::sync::Arc;

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::{
            vision::{MnistDataset, MnistItem},
            Dataset,
        },
    },
    prelude::Backend,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::{MnistBatch, MnistBatcher};
use crate::domain::{image::Image, traits::ImageSource};

/// A DataLoader producing batches of type `O`.
pub type Loader<O> = Arc<dyn DataLoader<O>>;

/// Most background workers a loader may use and still keep its
/// short batch at the end.
pub const MAX_WORKERS: usize = 1;

/// Batching parameters shared by the train and test loaders.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    pub batch_size:  usize,
    /// Background loading threads; 0 loads on the calling thread
    pub num_workers: usize,
    /// Seed for the training-set shuffle
    pub seed:        u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 128, num_workers: 1, seed: 42 }
    }
}

impl LoaderConfig {
    /// `num_workers` clamped to `MAX_WORKERS`.
    pub fn workers(&self) -> usize {
        if self.num_workers > MAX_WORKERS {
            tracing::warn!(
                "num_workers={} would split batches per worker; using {}",
                self.num_workers,
                MAX_WORKERS
            );
        }
        self.num_workers.min(MAX_WORKERS)
    }
}

/// Training and validation loaders over the two MNIST splits.
pub struct MnistLoaders<B: AutodiffBackend> {
    pub train: Loader<MnistBatch<B>>,
    pub test:  Loader<MnistBatch<B::InnerBackend>>,
}

/// Load MNIST and build a shuffled training loader and an ordered test loader.
///
/// Download failures surface as panics from burn's dataset downloader.
pub fn load_mnist<B: AutodiffBackend>(cfg: &LoaderConfig, device: &B::Device) -> MnistLoaders<B> {
    let (train_set, test_set) = load_datasets();

    let train = train_loader::<B, _>(train_set, cfg, device);
    let test  = test_loader::<B::InnerBackend, _>(test_set, cfg, device);

    MnistLoaders { train, test }
}

/// The raw train/test datasets, without any loaders. The plotting
/// commands read images from these directly.
pub fn load_datasets() -> (Arc<MnistDataset>, Arc<MnistDataset>) {
    tracing::info!("Loading MNIST (downloaded to burn's dataset cache on first use)");
    let train_set = Arc::new(MnistDataset::train());
    let test_set  = Arc::new(MnistDataset::test());
    tracing::info!(
        "MNIST ready: {} training images, {} test images",
        train_set.len(),
        test_set.len()
    );
    (train_set, test_set)
}

/// Shuffled loader over any MNIST-shaped dataset.
pub fn train_loader<B, D>(dataset: D, cfg: &LoaderConfig, device: &B::Device) -> Loader<MnistBatch<B>>
where
    B: Backend,
    D: Dataset<MnistItem> + 'static,
{
    let builder = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed);

    match cfg.workers() {
        0 => builder.build(dataset),
        n => builder.num_workers(n).build(dataset),
    }
}

/// In-order loader over any MNIST-shaped dataset.
pub fn test_loader<B, D>(dataset: D, cfg: &LoaderConfig, device: &B::Device) -> Loader<MnistBatch<B>>
where
    B: Backend,
    D: Dataset<MnistItem> + 'static,
{
    let builder = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size);

    match cfg.workers() {
        0 => builder.build(dataset),
        n => builder.num_workers(n).build(dataset),
    }
}

/// Convert one dataset item into a plotting image, scaled into [0, 1].
pub fn item_to_image(item: &MnistItem) -> Image {
    let pixels = item.image.iter().flatten().map(|&p| p / 255.0).collect();
    Image::new(item.image[0].len(), item.image.len(), pixels).with_label(item.label as usize)
}

impl ImageSource for MnistDataset {
    fn image(&self, index: usize) -> Option<Image> {
        self.get(index).map(|item| item_to_image(&item))
    }

    fn count(&self) -> usize {
        self.len()
    }
}

/// Synthetic MNIST items for tests: `n` images whose label is `i % 10`
/// and whose pixels brighten the left half for even labels and the
/// right half for odd ones, so a model can actually learn them.
#[cfg(test)]
pub(crate) fn synthetic_items(n: usize) -> Vec<MnistItem> {
    use crate::data::batcher::IMAGE_SIDE;

    (0..n)
        .map(|i| {
            let label = (i % 10) as u8;
            let mut image = [[0.0f32; IMAGE_SIDE]; IMAGE_SIDE];
            for row in image.iter_mut() {
                for (col, px) in row.iter_mut().enumerate() {
                    let left = col < IMAGE_SIDE / 2;
                    if left == (label % 2 == 0) {
                        *px = 25.0 * label as f32 + 5.0;
                    }
                }
            }
            MnistItem { image, label }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, data::dataset::InMemDataset};

    type TestBackend = NdArray;

    fn batch_sizes(loader: &Loader<MnistBatch<TestBackend>>) -> Vec<usize> {
        loader.iter().map(|b| b.len()).collect()
    }

    #[test]
    fn test_train_batches_are_full_except_last() {
        let cfg     = LoaderConfig { batch_size: 4, num_workers: 0, seed: 7 };
        let dataset = InMemDataset::new(synthetic_items(10));
        let loader  = train_loader::<TestBackend, _>(dataset, &cfg, &Default::default());

        assert_eq!(batch_sizes(&loader), vec![4, 4, 2]);
    }

    #[test]
    fn test_single_worker_keeps_full_batches() {
        let cfg     = LoaderConfig { batch_size: 3, num_workers: 1, seed: 7 };
        let dataset = InMemDataset::new(synthetic_items(9));
        let loader  = test_loader::<TestBackend, _>(dataset, &cfg, &Default::default());

        assert_eq!(batch_sizes(&loader), vec![3, 3, 3]);
    }

    #[test]
    fn test_extra_workers_do_not_split_batches() {
        let cfg = LoaderConfig { batch_size: 4, num_workers: 2, seed: 7 };
        assert_eq!(cfg.workers(), 1);

        let train = train_loader::<TestBackend, _>(InMemDataset::new(synthetic_items(10)), &cfg, &Default::default());
        let test  = test_loader::<TestBackend, _>(InMemDataset::new(synthetic_items(10)), &cfg, &Default::default());

        assert_eq!(batch_sizes(&train), vec![4, 4, 2]);
        assert_eq!(batch_sizes(&test), vec![4, 4, 2]);
    }

    #[test]
    fn test_loader_covers_every_item_once() {
        let cfg     = LoaderConfig { batch_size: 5, num_workers: 0, seed: 1 };
        let dataset = Arc::new(InMemDataset::new(synthetic_items(23)));
        let loader  = train_loader::<TestBackend, _>(dataset, &cfg, &Default::default());

        let total: usize = batch_sizes(&loader).iter().sum();
        assert_eq!(total, 23);
    }

    #[test]
    fn test_test_loader_preserves_order() {
        let cfg     = LoaderConfig { batch_size: 10, num_workers: 0, seed: 1 };
        let dataset = InMemDataset::new(synthetic_items(10));
        let loader  = test_loader::<TestBackend, _>(dataset, &cfg, &Default::default());

        let batch  = loader.iter().next().unwrap();
        let labels = batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(labels, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn test_item_to_image_scales_and_labels() {
        let items = synthetic_items(3);
        let im    = item_to_image(&items[2]);
        assert_eq!((im.width, im.height), (28, 28));
        assert_eq!(im.label, Some(2));
        assert!(im.max() <= 1.0);
        assert!((im.get(0, 0) - 55.0 / 255.0).abs() < 1e-6);
    }
}
