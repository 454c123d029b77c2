// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the downloaded MNIST files to batches of
// tensors on the compute device.
//
//   MnistDataset      → burn downloads and indexes the IDX files
//       │
//       ▼
//   MnistBatcher      → stacks items into [n, 1, 28, 28] tensors,
//       │               scaling pixels from 0..255 into [0, 1]
//       ▼
//   DataLoader        → shuffled training batches and ordered
//                       test batches, fed to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Implements Burn's Batcher trait to create image/label batches
pub mod batcher;

/// Loads the MNIST train/test pair and builds their loaders
pub mod mnist;
