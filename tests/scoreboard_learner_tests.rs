use std::collections::HashMap;

use ensemble_quant::calibration::{apply_outcome, Scoreboard};
use ensemble_quant::config::{Config, ModelTable};
use ensemble_quant::model::{
    ClosedTrade, ModelKey, ProcessingState, ReconciliationSource, TradeSide,
};

fn table() -> ModelTable {
    Config::default().model_table().unwrap()
}

fn trade(
    pnl_bps: f64,
    side: TradeSide,
    votes: Vec<(ModelKey, TradeSide, u32)>,
) -> ClosedTrade {
    let mut vote_map = HashMap::new();
    let mut buffer_map = HashMap::new();
    for (key, voted, buffer) in votes {
        vote_map.insert(key, voted);
        buffer_map.insert(key, buffer);
    }
    ClosedTrade {
        id: "t-1".to_string(),
        reconciliation: ReconciliationSource::ExchangeConfirmed,
        side,
        pnl_bps,
        votes: vote_map,
        buffer_at_vote: buffer_map,
        processing: ProcessingState::Pending,
        closed_at_ms: 1_700_000_000_000,
    }
}

#[test]
fn winning_vote_for_taken_side_scores_correct() {
    let mut t = trade(
        30.0,
        TradeSide::Long,
        vec![(ModelKey::Momentum, TradeSide::Long, 0)],
    );
    let mut scoreboard = Scoreboard::new();

    let summary = apply_outcome(&mut t, &mut scoreboard, &table());
    assert!(summary.applied);
    assert_eq!(summary.votes_scored, 1);

    let entry = scoreboard[&ModelKey::Momentum];
    assert_eq!(entry.correct, 1);
    assert_eq!(entry.wrong, 0);
    assert_eq!(entry.total, 1);
    assert!((entry.win_rate - 1.0).abs() < f64::EPSILON);
    assert_eq!(t.processing, ProcessingState::Learned);
}

#[test]
fn losing_trade_scores_wrong_even_for_taken_side_vote() {
    let mut t = trade(
        -12.0,
        TradeSide::Long,
        vec![
            (ModelKey::Momentum, TradeSide::Long, 0),
            (ModelKey::MeanReversion, TradeSide::Short, 0),
        ],
    );
    let mut scoreboard = Scoreboard::new();
    apply_outcome(&mut t, &mut scoreboard, &table());

    assert_eq!(scoreboard[&ModelKey::Momentum].wrong, 1);
    assert_eq!(scoreboard[&ModelKey::MeanReversion].wrong, 1);
}

#[test]
fn immature_votes_are_skipped_without_contaminating_tally() {
    // logistic needs 50 samples; it voted with only 10 in its buffer.
    let mut t = trade(
        40.0,
        TradeSide::Long,
        vec![
            (ModelKey::Logistic, TradeSide::Long, 10),
            (ModelKey::Momentum, TradeSide::Long, 0),
        ],
    );
    let mut scoreboard = Scoreboard::new();

    let summary = apply_outcome(&mut t, &mut scoreboard, &table());
    assert_eq!(summary.votes_scored, 1);
    assert_eq!(summary.votes_skipped_immature, 1);
    assert!(!scoreboard.contains_key(&ModelKey::Logistic));
    assert_eq!(scoreboard[&ModelKey::Momentum].total, 1);
}

#[test]
fn trade_with_only_immature_votes_is_still_marked_learned() {
    let mut t = trade(
        25.0,
        TradeSide::Short,
        vec![(ModelKey::RandomForest, TradeSide::Short, 3)],
    );
    let mut scoreboard = Scoreboard::new();

    let summary = apply_outcome(&mut t, &mut scoreboard, &table());
    assert!(summary.applied);
    assert_eq!(summary.votes_scored, 0);
    assert!(scoreboard.is_empty());
    assert_eq!(t.processing, ProcessingState::Learned);
    assert!(!t.is_unprocessed());
}

#[test]
fn mature_ml_vote_is_scored() {
    let mut t = trade(
        18.0,
        TradeSide::Short,
        vec![(ModelKey::DecisionTree, TradeSide::Short, 20)],
    );
    let mut scoreboard = Scoreboard::new();
    apply_outcome(&mut t, &mut scoreboard, &table());
    assert_eq!(scoreboard[&ModelKey::DecisionTree].correct, 1);
}

#[test]
fn already_learned_trade_is_not_reapplied() {
    let mut t = trade(
        30.0,
        TradeSide::Long,
        vec![(ModelKey::Momentum, TradeSide::Long, 0)],
    );
    let mut scoreboard = Scoreboard::new();

    assert!(apply_outcome(&mut t, &mut scoreboard, &table()).applied);
    assert!(!apply_outcome(&mut t, &mut scoreboard, &table()).applied);
    assert_eq!(scoreboard[&ModelKey::Momentum].total, 1);
}

#[test]
fn local_record_never_feeds_learning() {
    let mut t = trade(
        30.0,
        TradeSide::Long,
        vec![(ModelKey::Momentum, TradeSide::Long, 0)],
    );
    t.reconciliation = ReconciliationSource::Local;
    let mut scoreboard = Scoreboard::new();

    let summary = apply_outcome(&mut t, &mut scoreboard, &table());
    assert!(!summary.applied);
    assert!(scoreboard.is_empty());
    assert_eq!(t.processing, ProcessingState::Pending);
}

#[test]
fn totals_stay_consistent_over_many_trades() {
    let mut scoreboard = Scoreboard::new();
    let tbl = table();
    for i in 0..40 {
        let pnl = if i % 3 == 0 { -10.0 } else { 15.0 };
        let voted = if i % 2 == 0 {
            TradeSide::Long
        } else {
            TradeSide::Short
        };
        let mut t = trade(pnl, TradeSide::Long, vec![(ModelKey::Original, voted, 0)]);
        t.id = format!("t-{}", i);
        apply_outcome(&mut t, &mut scoreboard, &tbl);
    }
    let entry = scoreboard[&ModelKey::Original];
    assert_eq!(entry.total, 40);
    assert_eq!(entry.correct + entry.wrong, entry.total);
    assert!((entry.win_rate - entry.correct as f64 / 40.0).abs() < 1e-12);
}
