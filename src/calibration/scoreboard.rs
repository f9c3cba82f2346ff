use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ModelTable;
use crate::model::{ClosedTrade, ModelKey, ReconciliationSource};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
    pub win_rate: f64,
    pub weight: u32,
}

impl ScoreboardEntry {
    pub fn record(&mut self, was_correct: bool) {
        if was_correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }
        self.total = self.correct + self.wrong;
        self.win_rate = self.correct as f64 / self.total as f64;
    }
}

pub type Scoreboard = HashMap<ModelKey, ScoreboardEntry>;

/// Summary of one learning pass over a closed trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearnSummary {
    pub applied: bool,
    pub votes_scored: u32,
    pub votes_skipped_immature: u32,
}

/// Fold one closed trade's outcome into the per-model scoreboard.
///
/// Only exchange-confirmed trades are learned from, and a trade already
/// marked learned is a no-op, so replaying an event stream cannot
/// double-count. Votes a model cast before its training buffer reached the
/// configured minimum are skipped entirely; they would contaminate the tally
/// with guesses made on insufficient data. The trade is marked learned even
/// when every vote was skipped, so immature-only trades do not pile up as
/// perpetually unprocessed history.
pub fn apply_outcome(
    trade: &mut ClosedTrade,
    scoreboard: &mut Scoreboard,
    table: &ModelTable,
) -> LearnSummary {
    if trade.reconciliation != ReconciliationSource::ExchangeConfirmed || !trade.is_unprocessed() {
        return LearnSummary::default();
    }

    let is_win = trade.is_win();
    let mut summary = LearnSummary {
        applied: true,
        ..LearnSummary::default()
    };

    for (&key, &voted_side) in &trade.votes {
        let Some(min_samples) = table.min_samples(key) else {
            // Not in config: zero influence, nothing to score.
            continue;
        };
        let buffer_at_vote = trade.buffer_at_vote.get(&key).copied().unwrap_or(0);
        if min_samples > 0 && buffer_at_vote < min_samples {
            summary.votes_skipped_immature += 1;
            continue;
        }

        let was_correct = voted_side == trade.side && is_win;
        scoreboard.entry(key).or_default().record(was_correct);
        summary.votes_scored += 1;
    }

    trade.mark_learned();
    tracing::debug!(
        trade_id = %trade.id,
        votes_scored = summary.votes_scored,
        votes_skipped = summary.votes_skipped_immature,
        win = is_win,
        "Trade outcome folded into scoreboard"
    );
    summary
}
