use crate::config::{EnsembleConfig, ModelTable};
use crate::model::ModelKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Active,
    Training,
    Disabled,
}

/// Derived per-model voting status. Never stored; recomputed from config plus
/// the live runtime snapshot whenever it is needed.
#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub state: ModelState,
    pub effective_weight: u32,
    pub samples_needed: u32,
    pub can_vote: bool,
    pub reason: String,
}

impl ModelStatus {
    fn disabled(reason: &str) -> Self {
        Self {
            state: ModelState::Disabled,
            effective_weight: 0,
            samples_needed: 0,
            can_vote: false,
            reason: reason.to_string(),
        }
    }
}

/// Resolve a raw (possibly user- or wire-supplied) model key and evaluate its
/// voting status. Unrecognized keys fail safe to DISABLED; this path never
/// returns an error.
pub fn evaluate(
    key_text: &str,
    base_weight: u32,
    training_buffer_size: u32,
    ensemble: &EnsembleConfig,
    table: &ModelTable,
) -> ModelStatus {
    match key_text.parse::<ModelKey>() {
        Ok(key) => evaluate_key(key, base_weight, training_buffer_size, ensemble, table),
        Err(_) => ModelStatus::disabled("unknown model"),
    }
}

/// Typed evaluation path for callers that already hold a [`ModelKey`]. A key
/// missing from the config table is treated the same as an unknown key.
pub fn evaluate_key(
    key: ModelKey,
    base_weight: u32,
    training_buffer_size: u32,
    ensemble: &EnsembleConfig,
    table: &ModelTable,
) -> ModelStatus {
    let Some(min_samples) = table.min_samples(key) else {
        return ModelStatus::disabled("unknown model");
    };

    if min_samples == 0 {
        // Rule-based: always active, with a floor so it keeps a voice even
        // after a losing stretch zeroes its learned weight.
        return ModelStatus {
            state: ModelState::Active,
            effective_weight: base_weight.max(ensemble.weight_min_rule_based),
            samples_needed: 0,
            can_vote: true,
            reason: "rule-based, always active".to_string(),
        };
    }

    if training_buffer_size < min_samples {
        return ModelStatus {
            state: ModelState::Training,
            effective_weight: 0,
            samples_needed: min_samples - training_buffer_size,
            can_vote: false,
            reason: format!(
                "training: {} of {} samples",
                training_buffer_size, min_samples
            ),
        };
    }

    ModelStatus {
        state: ModelState::Active,
        effective_weight: base_weight,
        samples_needed: 0,
        can_vote: true,
        reason: "trained and active".to_string(),
    }
}
