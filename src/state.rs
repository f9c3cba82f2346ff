use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calibration::{RegimeState, Scoreboard};
use crate::config::ModelTable;
use crate::model::{ClosedTrade, ModelKey};

/// Live per-model counters mutated as training data accumulates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelRuntime {
    pub base_weight: u32,
    pub training_buffer_size: u32,
}

/// Aggregate root the calibration core operates on. One instance per
/// strategy, passed explicitly into every operation; the surrounding
/// application owns it for the process lifetime and checkpoints it through
/// the snapshot store at whatever cadence it likes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnsembleState {
    pub runtime: HashMap<ModelKey, ModelRuntime>,
    pub scoreboard: Scoreboard,
    pub regime: RegimeState,
    pub closed_trades: Vec<ClosedTrade>,
}

impl EnsembleState {
    /// Fresh state with a runtime slot for every configured model.
    pub fn new(table: &ModelTable) -> Self {
        let mut state = Self::default();
        for key in table.keys() {
            state.runtime.insert(key, ModelRuntime::default());
        }
        state
    }

    pub fn runtime_for(&self, key: ModelKey) -> ModelRuntime {
        self.runtime.get(&key).copied().unwrap_or_default()
    }

    /// Record that a model consumed one more training sample. Called by the
    /// surrounding application as feature rows are fed to the model.
    pub fn record_training_sample(&mut self, key: ModelKey) {
        let entry = self.runtime.entry(key).or_default();
        entry.training_buffer_size = entry.training_buffer_size.saturating_add(1);
    }

    pub fn unprocessed_count(&self) -> usize {
        self.closed_trades
            .iter()
            .filter(|t| t.is_unprocessed())
            .count()
    }
}
