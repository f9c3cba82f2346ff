pub mod key;
pub mod trade;

pub use key::{ModelKey, ModelKind};
pub use trade::{ClosedTrade, ProcessingState, ReconciliationSource, TradeSide};
