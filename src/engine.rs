// =============================================================================
// Bounce Engine — annotate a price series with indicators and the signal
// =============================================================================
//
// Pipeline (one pass per call, no state kept between calls):
//   1. Resolve the active policy into its conditions
//   2. Collect the indicator groups those conditions need, plus any extras
//      requested in configuration
//   3. Fail fast if the series lacks an input column any of them reads
//   4. Compute each indicator group and append its columns
//   5. AND the conditions into `bounce_signal`
// =============================================================================

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::annotated::AnnotatedSeries;
use crate::engine_config::EngineConfig;
use crate::error::EngineError;
use crate::indicators::bollinger::calculate_bollinger;
use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::calculate_macd;
use crate::indicators::returns::pct_change;
use crate::indicators::rolling::sma;
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::{columns, IndicatorKind, Series};
use crate::signals::{evaluate_all, Condition};
use crate::types::{input, PriceSeries};

/// Stateless indicator/signal engine. Holds only its validated configuration.
#[derive(Debug, Clone)]
pub struct BounceEngine {
    config: EngineConfig,
}

impl BounceEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Indicator groups appended by [`annotate`](Self::annotate), in column
    /// order.
    pub fn indicators(&self) -> Vec<IndicatorKind> {
        let conditions = self.config.policy.conditions(&self.config.thresholds);
        required_indicators(&conditions, &self.config.extra_indicators)
    }

    /// Compute every indicator the active policy needs and derive the bounce
    /// signal.
    ///
    /// # Edge cases
    /// - Zero rows => empty table whose only column is `bounce_signal`.
    /// - Fewer rows than a window => that indicator is all `None` and the
    ///   signal is `false` wherever it participates.
    pub fn annotate(&self, series: &PriceSeries) -> Result<AnnotatedSeries, EngineError> {
        let conditions = self.config.policy.conditions(&self.config.thresholds);
        let indicators = required_indicators(&conditions, &self.config.extra_indicators);

        // ── 1. Input columns ─────────────────────────────────────────────
        let inputs = conditions
            .iter()
            .flat_map(Condition::required_inputs)
            .chain(indicators.iter().flat_map(IndicatorKind::required_inputs));
        for &name in inputs {
            if !series.has_column(name) {
                return Err(EngineError::MissingColumn(name));
            }
        }

        // ── 2. Indicators ────────────────────────────────────────────────
        let mut table = AnnotatedSeries::new(series.clone());
        for &kind in &indicators {
            let computed = self.compute_indicator(kind, series)?;
            debug!(
                indicator = %kind,
                rows = series.len(),
                min_defined = min_defined(&computed),
                "indicator computed"
            );
            for (name, values) in computed {
                table.insert(name, values)?;
            }
        }

        // ── 3. Signal ────────────────────────────────────────────────────
        let signal = evaluate_all(&conditions, &table)?;
        table.set_signal(signal)?;

        info!(
            policy = %self.config.policy,
            rows = table.len(),
            indicators = indicators.len(),
            fired = table.fired_indices().len(),
            "series annotated"
        );

        Ok(table)
    }

    /// Compute the columns of one indicator group over `series`.
    pub fn compute_indicator(
        &self,
        kind: IndicatorKind,
        series: &PriceSeries,
    ) -> Result<Vec<(&'static str, Series)>, EngineError> {
        let closes = series.closes();
        let cfg = &self.config;

        let out = match kind {
            IndicatorKind::Bollinger => {
                let bb = calculate_bollinger(closes, cfg.bollinger.window, cfg.bollinger.num_std);
                vec![
                    (columns::SMA, bb.middle),
                    (columns::STD, bb.std),
                    (columns::BB_UPPER, bb.upper),
                    (columns::BB_LOWER, bb.lower),
                ]
            }
            IndicatorKind::Rsi => vec![(
                columns::RSI,
                calculate_rsi(closes, cfg.rsi.period, cfg.rsi.smoothing),
            )],
            IndicatorKind::Macd => {
                let m = calculate_macd(closes, cfg.macd.fast, cfg.macd.slow, cfg.macd.signal);
                vec![
                    (columns::MACD, m.macd),
                    (columns::MACD_SIGNAL, m.signal),
                    (columns::MACD_HIST, m.histogram),
                ]
            }
            IndicatorKind::EmaTrend => vec![
                (columns::EMA_FAST, calculate_ema(closes, cfg.ema_trend.fast)),
                (columns::EMA_SLOW, calculate_ema(closes, cfg.ema_trend.slow)),
            ],
            IndicatorKind::MovingAverage => {
                vec![(columns::MA, sma(closes, cfg.crossover.ma_window))]
            }
            IndicatorKind::VolumeMa => {
                let volumes = series.require(input::VOLUME)?;
                vec![(columns::VOLUME_MA, sma(volumes, cfg.crossover.volume_window))]
            }
            IndicatorKind::PriceChange => vec![(columns::PRICE_CHANGE, pct_change(closes, 1))],
        };
        Ok(out)
    }
}

/// Union of the groups the conditions need and the configured extras,
/// deduplicated and in `IndicatorKind` order.
fn required_indicators(conditions: &[Condition], extra: &[IndicatorKind]) -> Vec<IndicatorKind> {
    conditions
        .iter()
        .flat_map(|c| c.required_indicators().iter().copied())
        .chain(extra.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fewest defined values across the columns of one indicator group.
fn min_defined(group: &[(&'static str, Series)]) -> usize {
    group
        .iter()
        .map(|(_, values)| values.iter().flatten().count())
        .min()
        .unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_config::EngineConfig;
    use crate::signals::BouncePolicy;

    fn engine_with(policy: BouncePolicy) -> BounceEngine {
        BounceEngine::new(EngineConfig {
            policy,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BounceEngine>();
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = EngineConfig::default();
        cfg.bollinger.num_std = -2.0;
        assert!(matches!(
            BounceEngine::new(cfg),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn huge_periods_leave_indicators_undefined() {
        let json = r#"{
            "rsi": { "period": 18446744073709551615, "smoothing": "wilder" },
            "macd": { "signal": 18446744073709551615 },
            "ema_trend": { "slow": 18446744073709551615 },
            "bollinger": { "window": 18446744073709551615 }
        }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        let closes: Vec<f64> = (0..40).map(|i| 100.0 - i as f64).collect();
        let table = BounceEngine::new(cfg)
            .unwrap()
            .annotate(&PriceSeries::from_closes(closes))
            .unwrap();

        for name in [
            columns::RSI,
            columns::MACD_SIGNAL,
            columns::EMA_SLOW,
            columns::BB_LOWER,
        ] {
            assert!(table.column(name).unwrap().iter().all(Option::is_none), "{name}");
        }
        assert!(table.column(columns::MACD).unwrap()[25].is_some());
        assert!(table.signal().iter().all(|fired| !fired));
    }

    #[test]
    fn min_defined_reports_shortest_column() {
        let engine = engine_with(BouncePolicy::Confluence);
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin()).collect();
        let group = engine
            .compute_indicator(IndicatorKind::Macd, &PriceSeries::from_closes(closes))
            .unwrap();
        // MACD line from row 25, signal line from row 33.
        assert_eq!(min_defined(&group), 7);
        assert_eq!(min_defined(&[]), 0);
    }

    // ---- indicator selection ---------------------------------------------

    #[test]
    fn confluence_appends_only_its_indicators() {
        let engine = engine_with(BouncePolicy::Confluence);
        assert_eq!(
            engine.indicators(),
            vec![
                IndicatorKind::Bollinger,
                IndicatorKind::Rsi,
                IndicatorKind::Macd,
                IndicatorKind::EmaTrend,
            ]
        );

        let table = engine
            .annotate(&PriceSeries::from_closes(vec![100.0; 5]))
            .unwrap();
        assert_eq!(
            table.column_names(),
            vec![
                "sma",
                "std",
                "bb_upper",
                "bb_lower",
                "rsi",
                "macd",
                "macd_signal",
                "macd_hist",
                "ema_fast",
                "ema_slow",
                "bounce_signal",
            ]
        );
        assert!(table.column(columns::VOLUME_MA).is_none());
    }

    #[test]
    fn extra_indicators_are_deduplicated() {
        let mut cfg = EngineConfig::default();
        cfg.policy = BouncePolicy::SupportBounce;
        cfg.extra_indicators = vec![IndicatorKind::PriceChange, IndicatorKind::Bollinger];
        let engine = BounceEngine::new(cfg).unwrap();
        assert_eq!(
            engine.indicators(),
            vec![IndicatorKind::Bollinger, IndicatorKind::PriceChange]
        );
    }

    // ---- missing inputs --------------------------------------------------

    #[test]
    fn support_bounce_without_low_fails_fast() {
        let engine = engine_with(BouncePolicy::SupportBounce);
        let err = engine
            .annotate(&PriceSeries::from_closes(vec![1.0, 2.0, 3.0]))
            .unwrap_err();
        assert_eq!(err, EngineError::MissingColumn("Low"));
    }

    #[test]
    fn crossover_without_volume_fails_fast() {
        let engine = engine_with(BouncePolicy::MaCrossoverVolume);
        let err = engine
            .annotate(&PriceSeries::from_closes(vec![1.0, 2.0]))
            .unwrap_err();
        assert_eq!(err, EngineError::MissingColumn("Volume"));
    }

    #[test]
    fn extra_volume_ma_without_volume_fails() {
        let mut cfg = EngineConfig::default();
        cfg.extra_indicators = vec![IndicatorKind::VolumeMa];
        let engine = BounceEngine::new(cfg).unwrap();
        assert_eq!(
            engine.annotate(&PriceSeries::from_closes(vec![1.0])),
            Err(EngineError::MissingColumn("Volume"))
        );
    }

    // ---- signal ----------------------------------------------------------

    #[test]
    fn empty_series_gives_empty_table() {
        let table = engine_with(BouncePolicy::Confluence)
            .annotate(&PriceSeries::empty())
            .unwrap();
        assert!(table.is_empty());
        assert!(table.signal().is_empty());
        assert!(table.column_names().contains(&columns::BOUNCE_SIGNAL));
    }

    #[test]
    fn band_tolerance_fires_on_first_up_bar_after_drop() {
        // RSI at row 22 is 100 - 100 / (1 + 1/10) = 9.09; close 91 sits
        // below the lower band.
        let mut closes = vec![100.0; 20];
        closes.extend([95.0, 90.0, 91.0]);
        let table = engine_with(BouncePolicy::BandTolerance)
            .annotate(&PriceSeries::from_closes(closes))
            .unwrap();

        assert_eq!(table.fired_indices(), vec![22]);
        let rsi = table.value(columns::RSI, 22).unwrap();
        assert!((rsi - 100.0 / 11.0).abs() < 1e-10);
    }

    #[test]
    fn support_bounce_two_window_band() {
        let closes = vec![100.0, 98.0, 99.0];
        let lower = calculate_bollinger(&closes, 2, 2.0).lower;
        let touch = lower[1].unwrap();
        let series = PriceSeries::from_closes(closes)
            .with_low(vec![99.0, touch, 97.0])
            .unwrap();

        let mut cfg = EngineConfig::default();
        cfg.bollinger.window = 2;
        cfg.policy = BouncePolicy::SupportBounce;
        let table = BounceEngine::new(cfg).unwrap().annotate(&series).unwrap();

        assert_eq!(table.signal(), &[false, false, true]);
    }

    #[test]
    fn ma_crossover_with_volume_fires_on_cross() {
        let series = PriceSeries::from_closes(vec![10.0, 10.0, 9.0, 11.0])
            .with_volume(vec![100.0, 100.0, 100.0, 300.0])
            .unwrap();
        let mut cfg = EngineConfig::default();
        cfg.crossover.ma_window = 2;
        cfg.crossover.volume_window = 2;
        cfg.policy = BouncePolicy::MaCrossoverVolume;
        let table = BounceEngine::new(cfg).unwrap().annotate(&series).unwrap();

        // Row 2: close 9 < ma 9.5. Row 3: close 11 >= ma 10, volume 300 > 200.
        assert_eq!(table.signal(), &[false, false, false, true]);
        assert_eq!(table.value(columns::MA, 3), Some(10.0));
        assert_eq!(table.value(columns::VOLUME_MA, 3), Some(200.0));
    }

    #[test]
    fn empty_custom_policy_never_fires() {
        let engine = engine_with(BouncePolicy::Custom { conditions: vec![] });
        let table = engine
            .annotate(&PriceSeries::from_closes(vec![3.0, 2.0, 1.0, 2.0]))
            .unwrap();
        assert_eq!(table.signal(), &[false; 4]);
        assert_eq!(table.column_names(), vec![columns::BOUNCE_SIGNAL]);
    }

    #[test]
    fn input_series_is_left_untouched() {
        let series = PriceSeries::from_closes(vec![1.0, 2.0, 3.0]);
        let before = series.clone();
        let table = engine_with(BouncePolicy::Confluence)
            .annotate(&series)
            .unwrap();
        assert_eq!(series, before);
        assert_eq!(table.series(), &before);
    }
}
