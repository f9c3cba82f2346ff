pub mod confidence;
pub mod regime;
pub mod retention;
pub mod scoreboard;
pub mod status;

pub use confidence::{weight_from_bound, wilson_lower_bound, DEFAULT_WILSON_Z};
pub use regime::{Regime, RegimeController, RegimeState};
pub use retention::{trim, TrimResult};
pub use scoreboard::{apply_outcome, LearnSummary, Scoreboard, ScoreboardEntry};
pub use status::{evaluate, evaluate_key, ModelState, ModelStatus};
