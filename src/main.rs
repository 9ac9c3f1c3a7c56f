// =============================================================================
// bounce-scan — annotate a bar file and log the bars where a bounce fired
// =============================================================================
//
// Environment (a `.env` file is honoured):
//   BOUNCE_CONFIG      engine config JSON       (default: bounce_config.json)
//   BOUNCE_INPUT       bar CSV, or first arg    (required)
//   BOUNCE_TICKER      label for the log        (default: input file stem)
//   BOUNCE_SIGNAL_LOG  signal log CSV           (default: signal_log.csv)
//   BOUNCE_POLICY      overrides config policy  (e.g. band_tolerance)
//   RUST_LOG           tracing filter           (default: info)
// =============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bounce_scanner::indicators::columns;
use bounce_scanner::market_data::load_csv;
use bounce_scanner::signal_log::{SignalLog, SignalRecord};
use bounce_scanner::{BounceEngine, BouncePolicy, EngineConfig};

fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("BOUNCE_CONFIG").unwrap_or_else(|_| "bounce_config.json".to_string());
    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    if let Ok(name) = std::env::var("BOUNCE_POLICY") {
        config.policy = name
            .parse::<BouncePolicy>()
            .context("invalid BOUNCE_POLICY")?;
    }

    // ── 2. Input ─────────────────────────────────────────────────────────
    let input: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BOUNCE_INPUT").ok())
        .map(PathBuf::from)
        .context("no bar file given (pass a path or set BOUNCE_INPUT)")?;

    let ticker = std::env::var("BOUNCE_TICKER").unwrap_or_else(|_| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    });

    let series = load_csv(&input)?;

    // ── 3. Annotate ──────────────────────────────────────────────────────
    let engine = BounceEngine::new(config).context("invalid engine configuration")?;
    let table = engine.annotate(&series)?;

    let fired = table.fired_indices();
    info!(
        ticker = %ticker,
        policy = %engine.config().policy,
        rows = table.len(),
        fired = fired.len(),
        last_close = ?table.len().checked_sub(1).and_then(|i| table.close(i)),
        last_bb_lower = ?table.last_value(columns::BB_LOWER),
        last_rsi = ?table.last_value(columns::RSI),
        "scan complete"
    );

    for &row in fired.iter().rev().take(5) {
        info!(
            row,
            date = ?table.date(row),
            close = ?table.close(row),
            rsi = ?table.value(columns::RSI, row),
            "bounce"
        );
    }

    // ── 4. Signal log ────────────────────────────────────────────────────
    let log_path =
        std::env::var("BOUNCE_SIGNAL_LOG").unwrap_or_else(|_| "signal_log.csv".to_string());
    let log = SignalLog::new(log_path);
    let records = SignalRecord::from_annotated(&table, &ticker);
    let appended = log.append(&records)?;

    info!(path = %log.path().display(), appended, "done");
    Ok(())
}
