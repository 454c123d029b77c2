use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    prelude::*,
    tensor::activation::log_softmax,
};
use serde::{Deserialize, Serialize};

use crate::data::batcher::{IMAGE_SIDE, NUM_CLASSES};

/// Anything that maps an image batch to per-class log-probabilities.
///
/// images: [batch, 1, 28, 28] → log-probabilities: [batch, 10]
pub trait Classifier<B: Backend> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Which network architecture to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Flatten → hidden linear → ReLU → linear
    #[default]
    Dense,
    /// 3×3 convolution → ReLU → 2×2 max-pool → linear
    Conv,
}

// ─── Dense ────────────────────────────────────────────────────────────────────

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct DenseClassifierConfig {
    #[config(default = 100)]
    pub hidden: usize,
}

impl DenseClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DenseClassifier<B> {
        DenseClassifier {
            hidden:     LinearConfig::new(IMAGE_SIDE * IMAGE_SIDE, self.hidden).init(device),
            output:     LinearConfig::new(self.hidden, NUM_CLASSES).init(device),
            activation: Relu::new(),
        }
    }
}

#[derive(Module, Debug)]
pub struct DenseClassifier<B: Backend> {
    pub hidden:     Linear<B>,
    pub output:     Linear<B>,
    pub activation: Relu,
}

impl<B: Backend> Classifier<B> for DenseClassifier<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = images.flatten::<2>(1, 3); // [batch, 784]
        let x = self.activation.forward(self.hidden.forward(x));
        log_softmax(self.output.forward(x), 1)
    }
}

// ─── Convolutional ────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct ConvClassifierConfig {
    #[config(default = 9)]
    pub filters: usize,
}

impl ConvClassifierConfig {
    /// Side length after a 3×3 valid convolution and a 2×2 pool: 28 → 26 → 13
    const POOLED_SIDE: usize = (IMAGE_SIDE - 2) / 2;

    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvClassifier<B> {
        let flat = self.filters * Self::POOLED_SIDE * Self::POOLED_SIDE;
        ConvClassifier {
            conv:       Conv2dConfig::new([1, self.filters], [3, 3]).init(device),
            pool:       MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            activation: Relu::new(),
            output:     LinearConfig::new(flat, NUM_CLASSES).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvClassifier<B: Backend> {
    pub conv:       Conv2d<B>,
    pub pool:       MaxPool2d,
    pub activation: Relu,
    pub output:     Linear<B>,
}

impl<B: Backend> Classifier<B> for ConvClassifier<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv.forward(images)); // [batch, f, 26, 26]
        let x = self.pool.forward(x);                                // [batch, f, 13, 13]
        let x = x.flatten::<2>(1, 3);
        log_softmax(self.output.forward(x), 1)
    }
}
