use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::key::ModelKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

/// Where the closed-trade record came from. Only exchange-confirmed records
/// are allowed to feed the scoreboard; anything else is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationSource {
    ExchangeConfirmed,
    Local,
}

/// Single atomic learning state for a closed trade. Set to `Learned` exactly
/// once, after the scoreboard pass has evaluated the trade against every
/// config-eligible model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    Pending,
    Learned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: String,
    pub reconciliation: ReconciliationSource,
    pub side: TradeSide,
    pub pnl_bps: f64,
    /// Which side each model voted for on this trade.
    pub votes: HashMap<ModelKey, TradeSide>,
    /// Training-buffer size of each voting model at vote time. Used to skip
    /// votes cast before the model had enough data.
    pub buffer_at_vote: HashMap<ModelKey, u32>,
    pub processing: ProcessingState,
    pub closed_at_ms: u64,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl_bps > 0.0
    }

    /// A trade is unprocessed iff it is exchange-confirmed and learning has
    /// not yet consumed it. Local records never count as unprocessed, so a
    /// retention pass can only over-retain, never drop pending feedback.
    pub fn is_unprocessed(&self) -> bool {
        self.reconciliation == ReconciliationSource::ExchangeConfirmed
            && self.processing != ProcessingState::Learned
    }

    pub fn mark_learned(&mut self) {
        self.processing = ProcessingState::Learned;
    }
}
