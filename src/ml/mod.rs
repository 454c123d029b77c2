// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, loss and training code lives here.
//
//   model.rs       — the Classifier trait and two networks:
//                    a dense MLP and a small conv net, both
//                    ending in log-softmax over 10 digits
//
//   loss.rs        — negative log-likelihood and
//                    cross-entropy, selectable per run
//
//   trainer.rs     — train_epoch / validate / train, the
//                    optimiser choice, and backend selection
//                    (wgpu GPU or ndarray CPU)
//
//   convolution.rs — a 3×3 Conv2d loaded with a fixed kernel,
//                    used to preview what a filter does
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Digit classifier architectures
pub mod model;

/// Loss functions over log-probabilities / logits
pub mod loss;

/// Epoch loop with validation and per-epoch hooks
pub mod trainer;

/// Fixed-kernel convolution for filter previews
pub mod convolution;
