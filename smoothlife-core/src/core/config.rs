use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SmoothLifeError};

/// Transition rule constants
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    /// Sigmoid steepness divisor
    pub alpha: f64,
    /// Integration step size
    pub dt: f64,
    /// Birth interval lower/upper bound
    pub b1: f64,
    pub b2: f64,
    /// Death (survival) interval lower/upper bound
    pub d1: f64,
    pub d2: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        RuleParams {
            alpha: 0.028,
            dt: 0.05,
            b1: 0.278,
            b2: 0.365,
            d1: 0.267,
            d2: 0.445,
        }
    }
}

impl RuleParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(SmoothLifeError::invalid(format!(
                "alpha must be a positive finite number, got {}",
                self.alpha
            )));
        }
        if !(self.dt.is_finite() && self.dt >= 0.0) {
            return Err(SmoothLifeError::invalid(format!(
                "dt must be a non-negative finite number, got {}",
                self.dt
            )));
        }
        for (name, v) in [("b1", self.b1), ("b2", self.b2), ("d1", self.d1), ("d2", self.d2)] {
            if !v.is_finite() {
                return Err(SmoothLifeError::invalid(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

/// Outer/inner kernel geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub outer_radius: f64,
    /// Explicit inner radius. When absent the inner radius is
    /// `outer_radius / inner_radius_divisor`.
    pub inner_radius: Option<f64>,
    pub inner_radius_divisor: f64,
    pub outer_exclude_center: bool,
    pub inner_exclude_center: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            outer_radius: 11.0,
            inner_radius: None,
            inner_radius_divisor: 3.0,
            outer_exclude_center: false,
            inner_exclude_center: true,
        }
    }
}

impl KernelConfig {
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
            .unwrap_or(self.outer_radius / self.inner_radius_divisor)
    }

    pub fn validate(&self) -> Result<()> {
        check_radius("outer_radius", self.outer_radius)?;
        if !(self.inner_radius_divisor.is_finite() && self.inner_radius_divisor > 0.0) {
            return Err(SmoothLifeError::invalid(format!(
                "inner_radius_divisor must be positive, got {}",
                self.inner_radius_divisor
            )));
        }
        check_radius("inner_radius", self.inner_radius())
    }
}

pub(crate) fn check_radius(name: &str, radius: f64) -> Result<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(SmoothLifeError::invalid(format!(
            "{} must be a non-negative finite number, got {}",
            name, radius
        )))
    }
}

/// How neighborhood averages are computed each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvolutionMode {
    /// Frequency-domain product against cached kernel spectra, O(N log N).
    #[default]
    Spectral,
    /// Windowed sum over the compact weight table, O(N·R²).
    Direct,
}

/// Main parameters for a SmoothLife run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothLifeConfig {
    pub width: usize,
    pub height: usize,
    /// Number of independent state channels (1 to 3)
    pub channels: usize,
    pub kernel: KernelConfig,
    pub rule: RuleParams,
    pub convolution: ConvolutionMode,
    /// Row ranges per step. Defaults to twice the rayon pool size.
    pub partitions: Option<usize>,
}

impl Default for SmoothLifeConfig {
    fn default() -> Self {
        SmoothLifeConfig {
            width: 1024,
            height: 1024,
            channels: 3,
            kernel: KernelConfig::default(),
            rule: RuleParams::default(),
            convolution: ConvolutionMode::Spectral,
            partitions: None,
        }
    }
}

pub const MAX_CHANNELS: usize = 3;

impl SmoothLifeConfig {
    pub fn new(width: usize, height: usize) -> Self {
        SmoothLifeConfig {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SmoothLifeError::invalid(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(SmoothLifeError::invalid("grid cell count overflows usize"));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(SmoothLifeError::invalid(format!(
                "channels must be between 1 and {}, got {}",
                MAX_CHANNELS, self.channels
            )));
        }
        if self.partitions == Some(0) {
            return Err(SmoothLifeError::invalid("partitions must be at least 1"));
        }
        self.kernel.validate()?;
        self.rule.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SmoothLifeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_canonical_rule() {
        let cfg = SmoothLifeConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.kernel.inner_radius(), 11.0 / 3.0);
        assert!(!cfg.kernel.outer_exclude_center);
        assert!(cfg.kernel.inner_exclude_center);
        assert_eq!(cfg.rule.b1, 0.278);
    }

    #[test]
    fn explicit_inner_radius_wins() {
        let kernel = KernelConfig {
            outer_radius: 1.0,
            inner_radius: Some(0.0),
            ..KernelConfig::default()
        };
        assert_eq!(kernel.inner_radius(), 0.0);
        assert!(kernel.validate().is_ok());
    }

    #[test]
    fn rejects_bad_dimensions_and_radius() {
        assert!(SmoothLifeConfig::new(0, 8).validate().is_err());

        let mut cfg = SmoothLifeConfig::new(8, 8);
        cfg.kernel.outer_radius = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(SmoothLifeError::InvalidParameter(_))
        ));

        let mut cfg = SmoothLifeConfig::new(8, 8);
        cfg.channels = 4;
        assert!(cfg.validate().is_err());

        let mut cfg = SmoothLifeConfig::new(8, 8);
        cfg.partitions = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = SmoothLifeConfig::new(8, 8);
        cfg.rule.alpha = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = SmoothLifeConfig::from_json_str(
            r#"{ "width": 64, "height": 32, "channels": 1,
                 "kernel": { "outer_radius": 6.0 },
                 "convolution": "direct" }"#,
        )
        .unwrap();
        assert_eq!(cfg.cells(), 64 * 32);
        assert_eq!(cfg.kernel.inner_radius(), 2.0);
        assert_eq!(cfg.convolution, ConvolutionMode::Direct);
        assert_eq!(cfg.rule, RuleParams::default());

        let round = SmoothLifeConfig::from_json_str(&cfg.to_json()).unwrap();
        assert_eq!(round, cfg);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SmoothLifeConfig::from_json_str("{ width: }").unwrap_err();
        assert!(matches!(err, SmoothLifeError::Config(_)));
    }
}
