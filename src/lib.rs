// =============================================================================
// Bounce Scanner — indicator and bounce-signal engine for daily price bars
// =============================================================================
//
// Library layout:
//   types          input series (`PriceSeries`, `Bar`)
//   indicators     rolling stats, Bollinger, RSI, EMA/MACD, returns
//   signals        per-bar conditions and named bounce policies
//   engine         `BounceEngine::annotate`, the one public pipeline
//   annotated      the output table
//   engine_config  tunables, JSON load/save, validation
//   market_data    bar CSV loading
//   signal_log     append-only CSV log of fired bars
// =============================================================================

pub mod annotated;
pub mod engine;
pub mod engine_config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod signal_log;
pub mod signals;
pub mod types;

pub use annotated::AnnotatedSeries;
pub use engine::BounceEngine;
pub use engine_config::EngineConfig;
pub use error::EngineError;
pub use indicators::IndicatorKind;
pub use signals::{BouncePolicy, Condition};
pub use types::{Bar, PriceSeries};
