pub mod config;

pub use config::{ConvolutionMode, KernelConfig, RuleParams, SmoothLifeConfig};
