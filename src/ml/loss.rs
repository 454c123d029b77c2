// ============================================================
// Layer 5 — Loss Functions
// ============================================================
// Both losses return the batch mean as a single-element tensor.
//
//   nll            — negative log-likelihood. Expects the model
//                    output to already be log-probabilities:
//                    loss = -mean(log_probs[i, target_i])
//
//   cross-entropy  — Burn's CrossEntropyLoss, which applies
//                    log-softmax itself. On log-probability
//                    inputs it gives the same value as nll,
//                    since log_softmax is idempotent.

use burn::{nn::loss::CrossEntropyLossConfig, prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LossKind {
    #[default]
    Nll,
    CrossEntropy,
}

impl LossKind {
    /// output: [batch, classes], targets: [batch] → mean loss: [1]
    pub fn forward<B: Backend>(self, output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        match self {
            LossKind::Nll => nll_loss(output, targets),
            LossKind::CrossEntropy => CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output, targets),
        }
    }
}

/// Mean negative log-likelihood of the target classes.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [batch_size, _] = log_probs.dims();
    log_probs
        .gather(1, targets.reshape([batch_size, 1]))
        .mean()
        .neg()
}
