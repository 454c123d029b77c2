// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal per
// CLI command. Only workflow coordination lives here: no
// model code, no drawing, no printing.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Figure-only workflows: curves, filter previews, samples
pub mod plot_use_case;
