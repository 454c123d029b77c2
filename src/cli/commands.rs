// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `plot`, `filters`, `show`.
//
// The clap ValueEnums below mirror the application-layer
// enums; the From impls are the boundary, so nothing below
// Layer 1 ever sees a clap type.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::Result;
use clap::{builder::RangedU64ValueParser, Args, Subcommand, ValueEnum};

use crate::application::{
    plot_use_case::{CurvesUseCase, FiltersUseCase, SamplesUseCase, Split, MAX_SAMPLES},
    train_use_case::{DeviceKind, TrainConfig},
};
use crate::domain::kernel::{Kernel, KernelPreset};
use crate::data::mnist::MAX_WORKERS;
use crate::ml::{loss::LossKind, model::ModelKind, trainer::OptimizerKind};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a digit classifier on MNIST and plot its learning curves
    Train(TrainArgs),

    /// Redraw learning curves from a saved history.json
    Plot(PlotArgs),

    /// Show what a 3x3 convolution kernel does to training images
    Filters(FiltersArgs),

    /// Draw a row of dataset samples with their labels
    Show(ShowArgs),
}

// ─── Value enums ──────────────────────────────────────────────────────────────

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModelArg {
    Dense,
    Conv,
}

impl From<ModelArg> for ModelKind {
    fn from(a: ModelArg) -> Self {
        match a {
            ModelArg::Dense => ModelKind::Dense,
            ModelArg::Conv  => ModelKind::Conv,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OptimizerArg {
    Adam,
    Sgd,
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(a: OptimizerArg) -> Self {
        match a {
            OptimizerArg::Adam => OptimizerKind::Adam,
            OptimizerArg::Sgd  => OptimizerKind::Sgd,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LossArg {
    Nll,
    CrossEntropy,
}

impl From<LossArg> for LossKind {
    fn from(a: LossArg) -> Self {
        match a {
            LossArg::Nll          => LossKind::Nll,
            LossArg::CrossEntropy => LossKind::CrossEntropy,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DeviceArg {
    /// GPU if available, else the best adapter found
    Auto,
    Gpu,
    Cpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(a: DeviceArg) -> Self {
        match a {
            DeviceArg::Auto => DeviceKind::Auto,
            DeviceArg::Gpu  => DeviceKind::Gpu,
            DeviceArg::Cpu  => DeviceKind::Cpu,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KernelArg {
    VerticalEdge,
    HorizontalEdge,
    Blur,
    Sharpen,
    Laplacian,
}

impl From<KernelArg> for KernelPreset {
    fn from(a: KernelArg) -> Self {
        match a {
            KernelArg::VerticalEdge   => KernelPreset::VerticalEdge,
            KernelArg::HorizontalEdge => KernelPreset::HorizontalEdge,
            KernelArg::Blur           => KernelPreset::Blur,
            KernelArg::Sharpen        => KernelPreset::Sharpen,
            KernelArg::Laplacian      => KernelPreset::Laplacian,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SplitArg {
    Train,
    Test,
}

impl From<SplitArg> for Split {
    fn from(a: SplitArg) -> Self {
        match a {
            SplitArg::Train => Split::Train,
            SplitArg::Test  => Split::Test,
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory for history.json, metrics.csv, curves.png and checkpoints
    #[arg(long, default_value = "runs")]
    pub output_dir: String,

    /// Number of samples per batch
    #[arg(long, default_value_t = 128, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub epochs: usize,

    /// Optimiser learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Background data-loading threads (0 loads on the training thread)
    #[arg(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_WORKERS as u64))]
    pub num_workers: usize,

    /// Seed for shuffling the training set
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = ModelArg::Dense)]
    pub model: ModelArg,

    /// Hidden units of the dense model
    #[arg(long, default_value_t = 100)]
    pub hidden: usize,

    /// Filters in the conv model's convolution layer
    #[arg(long, default_value_t = 9)]
    pub conv_filters: usize,

    #[arg(long, value_enum, default_value_t = OptimizerArg::Adam)]
    pub optimizer: OptimizerArg,

    #[arg(long, value_enum, default_value_t = LossArg::Nll)]
    pub loss: LossArg,

    #[arg(long, value_enum, default_value_t = DeviceArg::Auto)]
    pub device: DeviceArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            output_dir:   a.output_dir,
            batch_size:   a.batch_size,
            epochs:       a.epochs,
            lr:           a.lr,
            num_workers:  a.num_workers,
            seed:         a.seed,
            model:        a.model.into(),
            hidden:       a.hidden,
            conv_filters: a.conv_filters,
            optimizer:    a.optimizer.into(),
            loss:         a.loss.into(),
            device:       a.device.into(),
        }
    }
}

// ─── plot ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// History written by `train`
    #[arg(long, default_value = "runs/history.json")]
    pub history: PathBuf,

    /// Output PNG
    #[arg(long, default_value = "runs/curves.png")]
    pub out: PathBuf,
}

impl From<PlotArgs> for CurvesUseCase {
    fn from(a: PlotArgs) -> Self {
        CurvesUseCase { history_path: a.history, out: a.out }
    }
}

// ─── filters ──────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct FiltersArgs {
    /// Named kernel to apply
    #[arg(long, value_enum, default_value_t = KernelArg::VerticalEdge, conflicts_with = "weights")]
    pub kernel: KernelArg,

    /// Custom kernel: 9 comma-separated numbers, row by row
    #[arg(long, allow_hyphen_values = true)]
    pub weights: Option<String>,

    /// Figure title (defaults to the preset's name)
    #[arg(long)]
    pub title: Option<String>,

    /// Output PNG
    #[arg(long, default_value = "runs/filters.png")]
    pub out: PathBuf,
}

impl FiltersArgs {
    pub fn into_use_case(self) -> Result<FiltersUseCase> {
        let preset = KernelPreset::from(self.kernel);
        let (kernel, default_title) = match &self.weights {
            Some(w) => (w.parse::<Kernel>()?, "Custom filter"),
            None    => (preset.kernel(), preset.title()),
        };
        Ok(FiltersUseCase {
            kernel,
            title: self.title.unwrap_or_else(|| default_title.to_string()),
            out:   self.out,
        })
    }
}

// ─── show ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// How many images to draw
    #[arg(long, default_value_t = 10, value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_SAMPLES as u64))]
    pub count: usize,

    #[arg(long, value_enum, default_value_t = SplitArg::Train)]
    pub split: SplitArg,

    /// Leave the class names off the images
    #[arg(long)]
    pub no_titles: bool,

    /// Output PNG
    #[arg(long, default_value = "runs/samples.png")]
    pub out: PathBuf,
}

impl From<ShowArgs> for SamplesUseCase {
    fn from(a: ShowArgs) -> Self {
        SamplesUseCase {
            split:  a.split.into(),
            count:  a.count,
            titled: !a.no_titles,
            out:    a.out,
        }
    }
}
