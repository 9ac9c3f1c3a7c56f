// =============================================================================
// Bounce Policies — named combinations of conditions
// =============================================================================
//
//   confluence           RSI < oversold, close < lower band, MACD > signal,
//                        fast EMA > slow EMA
//   band_tolerance       RSI < tolerant_oversold, close <= lower band * tol,
//                        positive momentum
//   support_bounce       prior bar touched the lower band, close up
//   ma_crossover_volume  close crosses up through the MA on above-average
//                        volume
//   custom               caller-supplied condition list
//
// Every policy is a pure AND; a custom policy with no conditions never fires.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::conditions::Condition;
use crate::engine_config::ThresholdParams;
use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum BouncePolicy {
    #[default]
    Confluence,
    BandTolerance,
    SupportBounce,
    MaCrossoverVolume,
    Custom { conditions: Vec<Condition> },
}

impl BouncePolicy {
    /// Conditions that must all hold for the policy to fire on a bar.
    pub fn conditions(&self, thresholds: &ThresholdParams) -> Vec<Condition> {
        match self {
            Self::Confluence => vec![
                Condition::RsiBelow {
                    threshold: thresholds.oversold,
                },
                Condition::CloseBelowLowerBand,
                Condition::MacdAboveSignal,
                Condition::FastEmaAboveSlow,
            ],
            Self::BandTolerance => vec![
                Condition::RsiBelow {
                    threshold: thresholds.tolerant_oversold,
                },
                Condition::CloseNearLowerBand {
                    tolerance: thresholds.band_tolerance,
                },
                Condition::PositiveMomentum,
            ],
            Self::SupportBounce => vec![Condition::SupportBounce],
            Self::MaCrossoverVolume => vec![Condition::MaCrossoverWithVolume],
            Self::Custom { conditions } => conditions.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Confluence => "confluence",
            Self::BandTolerance => "band_tolerance",
            Self::SupportBounce => "support_bounce",
            Self::MaCrossoverVolume => "ma_crossover_volume",
            Self::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for BouncePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the built-in policy names. Custom policies come from config only.
impl FromStr for BouncePolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "confluence" => Ok(Self::Confluence),
            "band_tolerance" => Ok(Self::BandTolerance),
            "support_bounce" => Ok(Self::SupportBounce),
            "ma_crossover_volume" => Ok(Self::MaCrossoverVolume),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown bounce policy '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confluence_uses_configured_oversold() {
        let thresholds = ThresholdParams {
            oversold: 25.0,
            ..ThresholdParams::default()
        };
        let conditions = BouncePolicy::Confluence.conditions(&thresholds);
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[0], Condition::RsiBelow { threshold: 25.0 });
        assert!(conditions.contains(&Condition::CloseBelowLowerBand));
    }

    #[test]
    fn band_tolerance_defaults() {
        let conditions = BouncePolicy::BandTolerance.conditions(&ThresholdParams::default());
        assert_eq!(
            conditions,
            vec![
                Condition::RsiBelow { threshold: 35.0 },
                Condition::CloseNearLowerBand { tolerance: 1.02 },
                Condition::PositiveMomentum,
            ]
        );
    }

    #[test]
    fn custom_policy_passes_conditions_through() {
        let policy = BouncePolicy::Custom {
            conditions: vec![Condition::MacdAboveSignal],
        };
        assert_eq!(
            policy.conditions(&ThresholdParams::default()),
            vec![Condition::MacdAboveSignal]
        );
    }

    #[test]
    fn parse_accepts_dashes_and_case() {
        assert_eq!("Band-Tolerance".parse::<BouncePolicy>(), Ok(BouncePolicy::BandTolerance));
        assert_eq!(
            " ma_crossover_volume ".parse::<BouncePolicy>(),
            Ok(BouncePolicy::MaCrossoverVolume)
        );
        assert!(matches!(
            "custom".parse::<BouncePolicy>(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn serde_tagged_by_name() {
        let json = serde_json::to_string(&BouncePolicy::SupportBounce).unwrap();
        assert_eq!(json, r#"{"name":"support_bounce"}"#);

        let custom: BouncePolicy = serde_json::from_str(
            r#"{"name":"custom","conditions":[{"kind":"rsi_below","threshold":40.0}]}"#,
        )
        .unwrap();
        assert_eq!(custom.name(), "custom");
        assert_eq!(custom.to_string(), "custom");
    }
}
