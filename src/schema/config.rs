//! Configuration types for pattern-evolver simulation parameters.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_iterations() -> u64 {
    100
}

fn default_tick_rate() -> f32 {
    30.0
}

fn default_frequency() -> f32 {
    6.0
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Side length of the square matching window (pw). Patterns must hold pw² cells.
    pub window_size: usize,
    /// How the trie answers window queries.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Stability threshold applied to the accumulator.
    #[serde(default)]
    pub policy: ThresholdPolicy,
    /// Noise source used for seeding and resampling.
    #[serde(default)]
    pub noise: NoiseConfig,
    /// Number of steps executed by a batch run.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Step frequency of the periodic runner.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            window_size: 3,
            match_mode: MatchMode::default(),
            policy: ThresholdPolicy::default(),
            noise: NoiseConfig::default(),
            iterations: default_iterations(),
            tick_rate_hz: default_tick_rate(),
        }
    }
}

/// Trie query mode used by the scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Each matching window contributes its pattern score.
    #[default]
    Scored,
    /// Each matching window contributes +1, whatever its score.
    Membership,
}

/// Rule deciding which cells are unstable and get resampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Unstable iff accumulated evidence is `<= 0`.
    #[default]
    NonPositive,
    /// Unstable iff accumulated evidence is below half the per-cell average.
    RelativeAverage,
}

/// Noise strategy names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Independent Bernoulli draw per cell.
    #[default]
    Uniform,
    /// Bernoulli draw thresholded by a coherent Perlin field.
    Gradient,
}

impl NoiseKind {
    /// Resolve a variant name. Unknown names fall back to `Uniform` with a warning.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "uniform" => NoiseKind::Uniform,
            "gradient" | "perlin" => NoiseKind::Gradient,
            other => {
                log::warn!("Unknown noise variant '{other}', falling back to uniform");
                NoiseKind::Uniform
            }
        }
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseKind::Uniform => write!(f, "uniform"),
            NoiseKind::Gradient => write!(f, "gradient"),
        }
    }
}

/// Noise source parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Selected strategy.
    #[serde(default)]
    pub variant: NoiseKind,
    /// Bias added to the sampling probability (roughly -0.5..0.5).
    #[serde(default)]
    pub offset: f32,
    /// Spatial frequency multiplier of the gradient field.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// RNG seed. `None` draws one from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            variant: NoiseKind::Uniform,
            offset: 0.0,
            frequency: default_frequency(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Number of cells in one matching window.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.window_size * self.window_size
    }

    /// Period between runner steps. Rejects rates whose period is not a
    /// representable duration (non-positive, NaN, or subnormal).
    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(ConfigError::InvalidTickRate);
        }
        Duration::try_from_secs_f32(1.0 / self.tick_rate_hz)
            .map_err(|_| ConfigError::InvalidTickRate)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.width, self.height)?;
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        self.tick_interval()?;
        if !(self.noise.frequency.is_finite() && self.noise.frequency > 0.0) {
            return Err(ConfigError::InvalidFrequency);
        }
        if !self.noise.offset.is_finite() {
            return Err(ConfigError::InvalidOffset);
        }
        Ok(())
    }
}

/// Reject zero-sized grids.
pub fn validate_dimensions(width: usize, height: usize) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Configuration and pattern validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Window size must be non-zero")]
    InvalidWindowSize,
    #[error("Tick rate must be positive")]
    InvalidTickRate,
    #[error("Noise frequency must be positive")]
    InvalidFrequency,
    #[error("Noise offset must be finite")]
    InvalidOffset,
    #[error("Pattern {index} is empty")]
    EmptyPattern { index: usize },
    #[error("Pattern {index} has non-binary value {value} at position {position}")]
    NonBinarySymbol {
        index: usize,
        position: usize,
        value: u8,
    },
    #[error("Pattern {index} has length {found}, expected {expected}")]
    PatternLengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Window size {window_size} does not fit patterns of length {pattern_len}")]
    WindowMismatch {
        window_size: usize,
        pattern_len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_len(), 9);
        assert_eq!(config.grid_size(), 128 * 128);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = SimulationConfig {
            width: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                width: 0,
                height: 128
            })
        );
    }

    #[test]
    fn test_tick_rate_must_give_a_duration() {
        let config = SimulationConfig::default();
        let interval = config.tick_interval().unwrap();
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-6);

        // 1e-40 is subnormal: its reciprocal is infinite. 1e-30 overflows a Duration.
        for rate in [0.0, -1.0, f32::NAN, f32::INFINITY, 1e-40, 1e-30] {
            let config = SimulationConfig {
                tick_rate_hz: rate,
                ..SimulationConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidTickRate), "rate {rate}");
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = SimulationConfig {
            window_size: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidWindowSize));
    }

    #[test]
    fn test_noise_kind_fallback() {
        assert_eq!(NoiseKind::from_name("gradient"), NoiseKind::Gradient);
        assert_eq!(NoiseKind::from_name(" Uniform "), NoiseKind::Uniform);
        assert_eq!(NoiseKind::from_name("simplex"), NoiseKind::Uniform);
    }

    #[test]
    fn test_json_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"width": 16, "height": 8, "window_size": 3}"#).unwrap();
        assert_eq!(config.match_mode, MatchMode::Scored);
        assert_eq!(config.policy, ThresholdPolicy::NonPositive);
        assert_eq!(config.noise.variant, NoiseKind::Uniform);
        assert_eq!(config.iterations, 100);
        assert!((config.noise.frequency - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_policy_names() {
        let policy: ThresholdPolicy = serde_json::from_str(r#""relative_average""#).unwrap();
        assert_eq!(policy, ThresholdPolicy::RelativeAverage);
        let mode: MatchMode = serde_json::from_str(r#""membership""#).unwrap();
        assert_eq!(mode, MatchMode::Membership);
    }
}
