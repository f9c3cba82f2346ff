use crate::model::ClosedTrade;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimResult {
    pub before: usize,
    pub after: usize,
    pub unprocessed: usize,
    pub processed_kept: usize,
    pub processed_dropped: usize,
}

/// Safe trim of the closed-trade history.
///
/// Unprocessed trades (exchange-confirmed, not yet learned) are kept
/// unconditionally in their original relative order; only processed trades
/// are capped, to the most recent `keep_processed`. The returned sequence is
/// unprocessed followed by kept-processed, ordered by category rather than
/// chronology, which is intentional: the learner scans for pending trades
/// regardless of position. Trades are only filtered, never mutated, so any
/// bug that fails to mark a trade learned fails toward over-retention.
pub fn trim(trades: Vec<ClosedTrade>, keep_processed: usize) -> (Vec<ClosedTrade>, TrimResult) {
    let before = trades.len();
    let (unprocessed, processed): (Vec<ClosedTrade>, Vec<ClosedTrade>) =
        trades.into_iter().partition(ClosedTrade::is_unprocessed);

    let processed_count = processed.len();
    let processed_dropped = processed_count.saturating_sub(keep_processed);
    let kept_processed: Vec<ClosedTrade> = processed.into_iter().skip(processed_dropped).collect();

    let result = TrimResult {
        before,
        unprocessed: unprocessed.len(),
        processed_kept: kept_processed.len(),
        processed_dropped,
        after: unprocessed.len() + kept_processed.len(),
    };

    let mut kept = unprocessed;
    kept.extend(kept_processed);

    if result.processed_dropped > 0 {
        tracing::debug!(
            before = result.before,
            after = result.after,
            unprocessed = result.unprocessed,
            dropped = result.processed_dropped,
            "Trimmed processed trade history"
        );
    }
    (kept, result)
}
