use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use ensemble_quant::config::Config;
use ensemble_quant::engine::CalibrationEngine;
use ensemble_quant::model::ClosedTrade;
use ensemble_quant::store::SnapshotStore;

const SNAPSHOT_DB_PATH: &str = "data/ensemble_snapshots.sqlite";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let trades_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => bail!("usage: calibration-replay <closed-trades.json> [strategy-label]"),
    };
    let strategy_label = args.next().unwrap_or_else(|| "default".to_string());

    let config = if Path::new("config/default.toml").exists() {
        Config::load().context("failed to load config/default.toml")?
    } else {
        Config::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let trades_json = std::fs::read_to_string(&trades_path)
        .with_context(|| format!("failed to read {}", trades_path.display()))?;
    let trades: Vec<ClosedTrade> = serde_json::from_str(&trades_json)
        .with_context(|| format!("failed to parse {}", trades_path.display()))?;

    let engine = CalibrationEngine::new(&config)?;
    let store = SnapshotStore::open(Path::new(SNAPSHOT_DB_PATH))?;
    let mut state = match store.load(&strategy_label)? {
        Some(restored) => {
            tracing::info!(strategy = %strategy_label, "Restored ensemble state from snapshot");
            restored
        }
        None => engine.new_state(),
    };

    let total = trades.len();
    for trade in trades {
        let result = engine.on_trade_closed(&mut state, trade);
        tracing::debug!(history = result.after, "Replayed trade");
    }

    println!("calibration replay: {} ({} trades)", strategy_label, total);
    println!("===================================");
    println!(
        "regime: {:?} (recent wins {})",
        state.regime.current, state.regime.recent_win_count
    );
    let mut keys: Vec<_> = engine.table().keys().collect();
    keys.sort_by_key(|k| k.as_str());
    for key in keys {
        let entry = state.scoreboard.get(&key).copied().unwrap_or_default();
        let status = engine.model_status(&state, key);
        println!(
            "- {:<14} {:>3}/{:<3} win_rate {:>5.1}%  weight {:>2}  {:?}",
            key.as_str(),
            entry.correct,
            entry.total,
            entry.win_rate * 100.0,
            status.effective_weight,
            status.state,
        );
    }
    println!(
        "history: {} trades retained ({} unprocessed)",
        state.closed_trades.len(),
        state.unprocessed_count()
    );

    store.save(&strategy_label, &state)?;
    tracing::info!(strategy = %strategy_label, "Checkpointed ensemble state");
    Ok(())
}
