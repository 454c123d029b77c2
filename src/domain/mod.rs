// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the things this
// lab works with: images, convolution kernels and the
// per-epoch metrics history.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O except through the Persistable trait
//   - Only plain Rust structs, enums, and traits
//
// The plotting code in Layer 6 only ever sees these types,
// so it can render curves and images without a backend.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The four-series training history
pub mod history;

// A single greyscale image with an optional class label
pub mod image;

// 3×3 convolution kernels and their named presets
pub mod kernel;

// Core abstractions (traits) that other layers implement
pub mod traits;
