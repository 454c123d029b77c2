// ============================================================
// Layer 5 — Training Loop
// ============================================================
// A generic supervised loop over Burn's DataLoader:
//
//   train_epoch — one pass over the training loader:
//                 forward → loss → backward → optimiser step
//   validate    — one pass over the test loader with the
//                 inference copy of the model (no gradients)
//   train       — `epochs` × (train_epoch, validate), printing
//                 one summary line per epoch and collecting the
//                 four metric series into a History
//
// Key Burn points:
//   - Training runs on B = Autodiff<Inner> for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Reported loss is the sum of the per-batch mean losses divided
// by the number of samples seen, so it scales with 1/batch_size.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::{
        ndarray::NdArrayDevice,
        wgpu::WgpuDevice,
        Autodiff, NdArray, Wgpu,
    },
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::data::{
    batcher::MnistBatch,
    mnist::{load_mnist, Loader},
};
use crate::domain::history::{EpochMetrics, History};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    loss::LossKind,
    model::{Classifier, ConvClassifierConfig, DenseClassifierConfig, ModelKind},
};

type GpuBackend = Autodiff<Wgpu>;
type CpuBackend = Autodiff<NdArray>;

/// Which optimiser updates the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Loss (summed batch means over sample count) and accuracy over one
/// pass of a loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub loss:     f64,
    pub accuracy: f64,
}

impl EpochStats {
    /// An empty pass has no defined loss and zero accuracy.
    fn from_sums(loss_sum: f64, correct: usize, count: usize) -> Self {
        if count == 0 {
            return Self { loss: f64::NAN, accuracy: 0.0 };
        }
        Self {
            loss:     loss_sum / count as f64,
            accuracy: correct as f64 / count as f64,
        }
    }
}

/// Hyper-parameters of the epoch loop.
#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub epochs:    usize,
    pub lr:        f64,
    pub loss:      LossKind,
    pub optimizer: OptimizerKind,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self { epochs: 10, lr: 0.01, loss: LossKind::Nll, optimizer: OptimizerKind::Adam }
    }
}

/// Number of rows whose arg-max matches the target.
fn correct_predictions<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predicted = output.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted.equal(targets).int().sum().into_scalar().elem::<i64>();
    correct as usize
}

/// One training pass. Returns the updated model and its stats.
pub fn train_epoch<B, M, O>(
    mut model: M,
    loader:    &Loader<MnistBatch<B>>,
    optim:     &mut O,
    lr:        f64,
    loss_fn:   LossKind,
) -> (M, EpochStats)
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    O: Optimizer<M, B>,
{
    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut count    = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.len();
        let output     = model.forward(batch.images);
        let loss       = loss_fn.forward(output.clone(), batch.targets.clone());

        loss_sum += loss.clone().into_scalar().elem::<f64>();
        correct  += correct_predictions(output, batch.targets);
        count    += batch_size;

        // Backward pass + optimiser update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);
    }

    (model, EpochStats::from_sums(loss_sum, correct, count))
}

/// One evaluation pass. The model is only borrowed, so its parameters
/// cannot change.
pub fn validate<B, M>(model: &M, loader: &Loader<MnistBatch<B>>, loss_fn: LossKind) -> EpochStats
where
    B: Backend,
    M: Classifier<B>,
{
    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut count    = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.len();
        let output     = model.forward(batch.images);
        let loss       = loss_fn.forward(output.clone(), batch.targets.clone());

        loss_sum += loss.into_scalar().elem::<f64>();
        correct  += correct_predictions(output, batch.targets);
        count    += batch_size;
    }

    EpochStats::from_sums(loss_sum, correct, count)
}

/// Run `opts.epochs` rounds of training and validation with an explicit
/// optimiser. `on_epoch` sees the model and metrics after every epoch.
pub fn train<B, M, O, F>(
    mut model:    M,
    train_loader: &Loader<MnistBatch<B>>,
    test_loader:  &Loader<MnistBatch<B::InnerBackend>>,
    optim:        &mut O,
    opts:         &TrainOptions,
    mut on_epoch: F,
) -> Result<(M, History)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
    O: Optimizer<M, B>,
    F: FnMut(&M, &EpochMetrics) -> Result<()>,
{
    let mut history = History::new();

    for ep in 0..opts.epochs {
        let (trained, train_stats) = train_epoch(model, train_loader, optim, opts.lr, opts.loss);
        model = trained;

        let val_stats = validate(&model.valid(), test_loader, opts.loss);

        println!(
            "Epoch {:2}, Train acc={:.3}, Val acc={:.3}, Train loss={:.3}, Val loss={:.3}",
            ep, train_stats.accuracy, val_stats.accuracy, train_stats.loss, val_stats.loss,
        );

        let metrics = EpochMetrics::new(
            ep + 1,
            train_stats.loss,
            train_stats.accuracy,
            val_stats.loss,
            val_stats.accuracy,
        );
        history.push(&metrics);
        on_epoch(&model, &metrics)?;
    }

    Ok((model, history))
}

/// `train` with an optimiser built from `opts.optimizer` and `opts.lr`.
pub fn fit<B, M, F>(
    model:        M,
    train_loader: &Loader<MnistBatch<B>>,
    test_loader:  &Loader<MnistBatch<B::InnerBackend>>,
    opts:         &TrainOptions,
    on_epoch:     F,
) -> Result<(M, History)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
    F: FnMut(&M, &EpochMetrics) -> Result<()>,
{
    match opts.optimizer {
        OptimizerKind::Adam => {
            let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
            train(model, train_loader, test_loader, &mut optim, opts, on_epoch)
        }
        OptimizerKind::Sgd => {
            let mut optim = SgdConfig::new().init();
            train(model, train_loader, test_loader, &mut optim, opts, on_epoch)
        }
    }
}

// ─── Entry point used by the application layer ────────────────────────────────

/// Pick the backend for the configured device and run a full training job.
pub fn run_training(
    cfg:          &TrainConfig,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<History> {
    match cfg.device {
        DeviceKind::Cpu => {
            let device = NdArrayDevice::Cpu;
            tracing::info!("Using ndarray CPU device: {:?}", device);
            train_loop::<CpuBackend>(cfg, device, ckpt_manager, metrics)
        }
        DeviceKind::Auto | DeviceKind::Gpu => {
            // DefaultDevice picks a discrete GPU first, then whatever adapter exists
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<GpuBackend>(cfg, device, ckpt_manager, metrics)
        }
    }
}

fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    device:       B::Device,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<History> {
    let loaders = load_mnist::<B>(&cfg.loader_config(), &device);

    match cfg.model {
        ModelKind::Dense => {
            let model = DenseClassifierConfig::new()
                .with_hidden(cfg.hidden)
                .init::<B>(&device);
            tracing::info!("Model ready: dense, hidden={}", cfg.hidden);
            fit_and_record(model, &loaders.train, &loaders.test, cfg, ckpt_manager, metrics)
        }
        ModelKind::Conv => {
            let model = ConvClassifierConfig::new()
                .with_filters(cfg.conv_filters)
                .init::<B>(&device);
            tracing::info!("Model ready: conv, filters={}", cfg.conv_filters);
            fit_and_record(model, &loaders.train, &loaders.test, cfg, ckpt_manager, metrics)
        }
    }
}

fn fit_and_record<B, M>(
    model:        M,
    train_loader: &Loader<MnistBatch<B>>,
    test_loader:  &Loader<MnistBatch<B::InnerBackend>>,
    cfg:          &TrainConfig,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<History>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
{
    let opts = cfg.train_options();

    let (_model, history) = fit(model, train_loader, test_loader, &opts, |model, m| {
        metrics.log(m)?;
        ckpt_manager.save_model::<B, M>(model, m.epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", m.epoch);
        Ok(())
    })?;

    if let Some(best) = history.best_epoch() {
        tracing::info!("Best validation accuracy {:.3} at epoch {}", best.val_acc, best.epoch);
    }
    tracing::info!("Training complete!");
    Ok(history)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mnist::{synthetic_items, test_loader, train_loader, LoaderConfig};
    use crate::domain::history::HISTORY_KEYS;
    use crate::ml::model::{DenseClassifier, DenseClassifierConfig};
    use burn::{data::dataset::InMemDataset, module::Param};

    type TestBackend = Autodiff<NdArray>;
    type InnerBackend = NdArray;

    fn loaders(
        n: usize,
    ) -> (Loader<MnistBatch<TestBackend>>, Loader<MnistBatch<InnerBackend>>) {
        let cfg    = LoaderConfig { batch_size: 8, num_workers: 0, seed: 3 };
        let device = NdArrayDevice::Cpu;
        (
            train_loader::<TestBackend, _>(InMemDataset::new(synthetic_items(n)), &cfg, &device),
            test_loader::<InnerBackend, _>(InMemDataset::new(synthetic_items(n / 2)), &cfg, &device),
        )
    }

    fn model() -> DenseClassifier<TestBackend> {
        DenseClassifierConfig::new().with_hidden(16).init(&NdArrayDevice::Cpu)
    }

    fn weights<B: Backend>(m: &DenseClassifier<B>) -> Vec<f32> {
        let mut w = m.hidden.weight.val().into_data().convert::<f32>().to_vec::<f32>().unwrap();
        w.extend(m.output.weight.val().into_data().convert::<f32>().to_vec::<f32>().unwrap());
        w
    }

    #[test]
    fn test_history_has_four_series_of_epoch_length() {
        let (train_l, test_l) = loaders(40);
        let opts = TrainOptions { epochs: 3, ..Default::default() };

        let (_, history) = fit(model(), &train_l, &test_l, &opts, |_, _| Ok(())).unwrap();

        assert!(history.is_consistent());
        for key in HISTORY_KEYS {
            assert_eq!(history.series(key).unwrap().len(), 3, "series {key}");
        }
    }

    #[test]
    fn test_metrics_stay_in_range() {
        let (train_l, test_l) = loaders(30);
        let opts = TrainOptions { epochs: 2, optimizer: OptimizerKind::Sgd, ..Default::default() };

        let (_, history) = fit(model(), &train_l, &test_l, &opts, |_, m| {
            assert!(m.in_range(), "{m:?}");
            Ok(())
        })
        .unwrap();

        for e in 1..=history.len() {
            assert!(history.epoch(e).unwrap().in_range());
        }
    }

    #[test]
    fn test_validate_leaves_parameters_unchanged() {
        let (_, test_l) = loaders(20);
        let inner  = model().valid();
        let before = weights(&inner);

        let stats = validate(&inner, &test_l, LossKind::Nll);

        assert_eq!(before, weights(&inner));
        assert!(stats.loss >= 0.0);
        assert!((0.0..=1.0).contains(&stats.accuracy));
    }

    /// A model whose output layer is all zeros predicts the uniform
    /// distribution, so every batch's NLL is exactly ln(10).
    fn uniform_model() -> DenseClassifier<TestBackend> {
        let mut m = model();
        m.output.weight = Param::from_tensor(m.output.weight.val().zeros_like());
        m.output.bias   = m.output.bias.map(|b| Param::from_tensor(b.val().zeros_like()));
        m
    }

    #[test]
    fn test_loss_is_sum_of_batch_means_over_samples() {
        // 32 training items in 4 batches, 16 test items in 2 batches
        let (train_l, test_l) = loaders(32);
        let expected = 10f64.ln() / 8.0;

        let val = validate(&uniform_model().valid(), &test_l, LossKind::Nll);
        assert!((val.loss - expected).abs() < 1e-5, "val loss {}", val.loss);

        let mut optim = SgdConfig::new().init();
        let (_, train) = train_epoch(uniform_model(), &train_l, &mut optim, 0.0, LossKind::Nll);
        assert!((train.loss - expected).abs() < 1e-5, "train loss {}", train.loss);
    }

    #[test]
    fn test_train_epoch_updates_parameters() {
        let (train_l, _) = loaders(16);
        let m      = model();
        let before = weights(&m);
        let mut optim = AdamConfig::new().init();

        let (m, stats) = train_epoch(m, &train_l, &mut optim, 0.01, LossKind::Nll);

        assert_ne!(before, weights(&m));
        assert!(stats.loss.is_finite());
    }

    #[test]
    fn test_training_lowers_loss_on_separable_data() {
        let (train_l, test_l) = loaders(80);
        let opts = TrainOptions { epochs: 8, ..Default::default() };

        let (_, history) = fit(model(), &train_l, &test_l, &opts, |_, _| Ok(())).unwrap();

        let first = history.train_loss[0];
        let last  = *history.train_loss.last().unwrap();
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn test_on_epoch_errors_stop_training() {
        let (train_l, test_l) = loaders(16);
        let opts = TrainOptions { epochs: 5, ..Default::default() };

        let mut seen = 0;
        let result = fit(model(), &train_l, &test_l, &opts, |_, _| {
            seen += 1;
            anyhow::bail!("disk full")
        });

        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_empty_loader_gives_nan_loss_and_zero_accuracy() {
        let stats = EpochStats::from_sums(0.0, 0, 0);
        assert!(stats.loss.is_nan());
        assert_eq!(stats.accuracy, 0.0);
    }
}
