//! SmoothLife Core - Continuous Cellular Automaton Engine
//!
//! This library evolves a toroidal grid of real-valued cells (one to three
//! channels) with the SmoothLife rule: every step each cell's outer and inner
//! neighborhood averages are computed by spectral (or direct) convolution with
//! Gaussian-weighted disc kernels, fed through a nested-sigmoid transition
//! rule, and integrated into a double-buffered next generation in parallel.
//!
//! # Example
//!
//! ```rust,no_run
//! use smoothlife_core::SmoothLife;
//!
//! // 256x256 RGB world, outer radius 11, 60% of cells seeded
//! let (mut engine, mut pixels) = SmoothLife::initialize(256, 256, 11.0, 0.6)?;
//!
//! // Render loop: upload `pixels`, then advance
//! for _ in 0..100 {
//!     engine.step_pixels(&mut pixels)?;
//! }
//! # Ok::<(), smoothlife_core::SmoothLifeError>(())
//! ```

pub mod automaton;
pub mod core;
pub mod error;
pub mod field;
pub mod render;
pub mod utils;

// Re-export key types
pub use automaton::{GridState, ParallelStepper, Seed, SmoothLife, StepPhase, TransitionRule};
pub use crate::core::config::{ConvolutionMode, KernelConfig, RuleParams, SmoothLifeConfig};
pub use error::{Result, SmoothLifeError};
pub use field::{
    DirectConvolver, FftTransform, Kernel, KernelBuilder, KernelField, SpectralConvolver,
    SpectralTransform,
};
pub use render::{Frame, PixelProjector, SharedFrame};
pub use utils::benchmark::{BenchmarkReport, StepBenchmark};

/// Initialize tracing for the library.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
