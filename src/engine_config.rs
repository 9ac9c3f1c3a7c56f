// =============================================================================
// Engine Configuration — indicator windows, thresholds and the active policy
// =============================================================================
//
// Every tunable parameter of the bounce engine lives here. All fields carry
// `#[serde(default = ...)]` so a partial JSON file (or `{}`) loads with the
// documented defaults.
//
// Persistence uses an atomic tmp + rename pattern. `validate()` is the only
// gate between a loaded file and the engine.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::indicators::rsi::RsiSmoothing;
use crate::indicators::IndicatorKind;
use crate::signals::{BouncePolicy, Condition};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_window() -> usize {
    20
}

fn default_num_std() -> f64 {
    2.0
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_ema_fast() -> usize {
    9
}

fn default_ema_slow() -> usize {
    21
}

fn default_oversold() -> f64 {
    30.0
}

fn default_tolerant_oversold() -> f64 {
    35.0
}

fn default_band_tolerance() -> f64 {
    1.02
}

// =============================================================================
// Parameter groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    #[serde(default = "default_window")]
    pub window: usize,

    /// Band width in standard deviations. Must be finite and non-negative.
    #[serde(default = "default_num_std")]
    pub num_std: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            window: default_window(),
            num_std: default_num_std(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    #[serde(default = "default_rsi_period")]
    pub period: usize,

    #[serde(default)]
    pub smoothing: RsiSmoothing,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: default_rsi_period(),
            smoothing: RsiSmoothing::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    #[serde(default = "default_macd_fast")]
    pub fast: usize,

    #[serde(default = "default_macd_slow")]
    pub slow: usize,

    #[serde(default = "default_macd_signal")]
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: default_macd_fast(),
            slow: default_macd_slow(),
            signal: default_macd_signal(),
        }
    }
}

/// Fast/slow EMA pair used by the trend-confirmation condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaTrendParams {
    #[serde(default = "default_ema_fast")]
    pub fast: usize,

    #[serde(default = "default_ema_slow")]
    pub slow: usize,
}

impl Default for EmaTrendParams {
    fn default() -> Self {
        Self {
            fast: default_ema_fast(),
            slow: default_ema_slow(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverParams {
    /// Close moving-average window.
    #[serde(default = "default_window")]
    pub ma_window: usize,

    /// Volume moving-average window.
    #[serde(default = "default_window")]
    pub volume_window: usize,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            ma_window: default_window(),
            volume_window: default_window(),
        }
    }
}

/// Thresholds consumed by the preset policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    /// RSI level for the confluence policy.
    #[serde(default = "default_oversold")]
    pub oversold: f64,

    /// Looser RSI level for the band-tolerance policy.
    #[serde(default = "default_tolerant_oversold")]
    pub tolerant_oversold: f64,

    /// Multiplier on the lower band (1.02 = within 2%).
    #[serde(default = "default_band_tolerance")]
    pub band_tolerance: f64,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            oversold: default_oversold(),
            tolerant_oversold: default_tolerant_oversold(),
            band_tolerance: default_band_tolerance(),
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub bollinger: BollingerParams,

    #[serde(default)]
    pub rsi: RsiParams,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub ema_trend: EmaTrendParams,

    #[serde(default)]
    pub crossover: CrossoverParams,

    #[serde(default)]
    pub thresholds: ThresholdParams,

    /// Policy that produces `bounce_signal`.
    #[serde(default)]
    pub policy: BouncePolicy,

    /// Indicators to append even when the policy does not need them.
    #[serde(default)]
    pub extra_indicators: Vec<IndicatorKind>,
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error; the caller decides whether to fall back to
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            policy = %config.policy,
            window = config.bollinger.window,
            rsi_period = config.rsi.period,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Reject parameters that would break the indicator contracts.
    ///
    /// # Edge cases
    /// - `num_std == 0` is accepted; the bands collapse onto the SMA.
    /// - `bollinger.window == 1` is accepted; std is undefined on every row.
    pub fn validate(&self) -> Result<(), EngineError> {
        let periods = [
            ("bollinger.window", self.bollinger.window),
            ("rsi.period", self.rsi.period),
            ("macd.fast", self.macd.fast),
            ("macd.slow", self.macd.slow),
            ("macd.signal", self.macd.signal),
            ("ema_trend.fast", self.ema_trend.fast),
            ("ema_trend.slow", self.ema_trend.slow),
            ("crossover.ma_window", self.crossover.ma_window),
            ("crossover.volume_window", self.crossover.volume_window),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            return Err(EngineError::InvalidConfig(format!("{name} must be > 0")));
        }

        let k = self.bollinger.num_std;
        if !k.is_finite() || k < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "bollinger.num_std must be finite and >= 0, got {k}"
            )));
        }

        let thresholds = [
            ("thresholds.oversold", self.thresholds.oversold),
            ("thresholds.tolerant_oversold", self.thresholds.tolerant_oversold),
        ];
        if let Some((name, value)) = thresholds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }

        let tolerance = self.thresholds.band_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "thresholds.band_tolerance must be finite and > 0, got {tolerance}"
            )));
        }

        for condition in self.policy.conditions(&self.thresholds) {
            match condition {
                Condition::RsiBelow { threshold } if !threshold.is_finite() => {
                    return Err(EngineError::InvalidConfig(format!(
                        "rsi_below threshold must be finite, got {threshold}"
                    )));
                }
                Condition::CloseNearLowerBand { tolerance }
                    if !tolerance.is_finite() || tolerance <= 0.0 =>
                {
                    return Err(EngineError::InvalidConfig(format!(
                        "close_near_lower_band tolerance must be finite and > 0, got {tolerance}"
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
