use anyhow::Result;

use crate::calibration::{
    apply_outcome, evaluate_key, trim, weight_from_bound, wilson_lower_bound, ModelStatus,
    RegimeController, TrimResult,
};
use crate::config::{Config, EnsembleConfig, ModelTable, RetentionConfig};
use crate::model::{ClosedTrade, ModelKey, ModelKind};
use crate::state::EnsembleState;

/// Single-writer pipeline that applies a trade-close event end to end:
/// scoreboard learning, confidence reweighting, regime update, retention
/// trim. Callers serialize events; the engine takes `&mut EnsembleState`
/// and every pass is synchronous and bounded.
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    ensemble: EnsembleConfig,
    retention: RetentionConfig,
    table: ModelTable,
    regime: RegimeController,
}

impl CalibrationEngine {
    pub fn new(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            ensemble: cfg.ensemble.clone(),
            retention: cfg.retention.clone(),
            table: cfg.model_table()?,
            regime: RegimeController::new(cfg.regime.clone()),
        })
    }

    pub fn table(&self) -> &ModelTable {
        &self.table
    }

    pub fn new_state(&self) -> EnsembleState {
        EnsembleState::new(&self.table)
    }

    /// Apply one closed trade against the state. Returns the trim summary of
    /// the retention pass that runs after learning, so the caller can see
    /// what the history shrank to.
    pub fn on_trade_closed(&self, state: &mut EnsembleState, trade: ClosedTrade) -> TrimResult {
        state.closed_trades.push(trade);

        let learned = self.learn_pending(state);
        self.reweight(state);

        let recent_wins = self.recent_win_count(state);
        self.regime.update(&mut state.regime, recent_wins);

        let trades = std::mem::take(&mut state.closed_trades);
        let (kept, result) = trim(trades, self.retention.keep_processed_trades);
        state.closed_trades = kept;

        tracing::debug!(
            learned,
            recent_wins,
            regime = ?state.regime.current,
            history = result.after,
            "Trade-close pipeline finished"
        );
        result
    }

    /// Scoreboard pass over every confirmed trade learning has not consumed
    /// yet. Re-running it is safe: learned trades are skipped wholesale.
    pub fn learn_pending(&self, state: &mut EnsembleState) -> u32 {
        let mut learned = 0;
        for trade in &mut state.closed_trades {
            if apply_outcome(trade, &mut state.scoreboard, &self.table).applied {
                learned += 1;
            }
        }
        learned
    }

    /// Recompute every configured model's weight from its win/loss record:
    /// Wilson lower bound of the observed win rate, rescaled above the
    /// breakeven baseline into the integer weight budget.
    fn reweight(&self, state: &mut EnsembleState) {
        for key in self.table.keys() {
            let entry = state.scoreboard.entry(key).or_default();
            let bound = wilson_lower_bound(entry.win_rate, entry.total as f64, self.ensemble.wilson_z);
            let weight = weight_from_bound(bound, &self.ensemble);
            entry.weight = weight;
            state.runtime.entry(key).or_default().base_weight = weight;
        }

        if self.all_effective_weights_zero(state) {
            self.recover_weights(state);
        }
    }

    fn all_effective_weights_zero(&self, state: &EnsembleState) -> bool {
        self.table.keys().all(|key| {
            let rt = state.runtime_for(key);
            evaluate_key(
                key,
                rt.base_weight,
                rt.training_buffer_size,
                &self.ensemble,
                &self.table,
            )
            .effective_weight
                == 0
        })
    }

    /// Self-healing reset for a voiceless ensemble: restore rule-based
    /// models to the floor weight so the bot can always cast a vote. If the
    /// config carries no rule-based model at all, floor everything.
    fn recover_weights(&self, state: &mut EnsembleState) {
        let rule_based: Vec<ModelKey> = self
            .table
            .keys()
            .filter(|k| k.kind() == ModelKind::RuleBased)
            .collect();
        let targets: Vec<ModelKey> = if rule_based.is_empty() {
            self.table.keys().collect()
        } else {
            rule_based
        };

        for key in &targets {
            let rt = state.runtime.entry(*key).or_default();
            rt.base_weight = rt.base_weight.max(self.ensemble.weight_min_rule_based);
        }
        tracing::warn!(
            restored = targets.len(),
            floor = self.ensemble.weight_min_rule_based,
            "All effective weights hit zero; reset to minimal rule-based configuration"
        );
    }

    /// Wins among the most recent closed trades, over the regime window.
    /// Recency is taken from close timestamps since the retained history is
    /// ordered by retention category, not chronology.
    fn recent_win_count(&self, state: &EnsembleState) -> u32 {
        let mut outcomes: Vec<(u64, bool)> = state
            .closed_trades
            .iter()
            .map(|t| (t.closed_at_ms, t.is_win()))
            .collect();
        outcomes.sort_by_key(|(ts, _)| *ts);
        outcomes
            .iter()
            .rev()
            .take(self.regime.window())
            .filter(|(_, win)| *win)
            .count() as u32
    }

    /// Derived voting status for one model, from config plus the live
    /// runtime snapshot.
    pub fn model_status(&self, state: &EnsembleState, key: ModelKey) -> ModelStatus {
        let rt = state.runtime_for(key);
        evaluate_key(
            key,
            rt.base_weight,
            rt.training_buffer_size,
            &self.ensemble,
            &self.table,
        )
    }

    /// Position size after applying the current regime's risk posture.
    pub fn scaled_position_size(&self, state: &EnsembleState, intended: f64) -> f64 {
        self.regime
            .scaled_position_size(state.regime.current, intended)
    }
}
