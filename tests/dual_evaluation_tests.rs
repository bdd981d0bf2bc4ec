mod common;

use chess_dual_eval::{
    DualEvaluator, EngineEvaluation, EvaluationCache, ManualClock, Outcome, TablebaseEvaluation,
    EVALUATION_UNAVAILABLE,
};
use common::{MockEngine, MockTablebase, AFTER_E4, KQK_BLACK, KQK_WHITE, START};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn evaluator(
    engine: &Arc<MockEngine>,
    tablebase: &Arc<MockTablebase>,
) -> DualEvaluator<Arc<MockEngine>, Arc<MockTablebase>> {
    let cache = Arc::new(EvaluationCache::new(64, Duration::from_secs(300)));
    DualEvaluator::new(engine.clone(), tablebase.clone(), cache)
}

#[tokio::test]
async fn test_tablebase_failure_leaves_engine_half() {
    let engine = Arc::new(MockEngine::new().with(START, EngineEvaluation::centipawns(35)));
    let tablebase = Arc::new(MockTablebase::failing());

    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(START)
        .await;

    assert_eq!(evaluation.engine.score, 35);
    assert_eq!(evaluation.engine.evaluation, "+0.4");
    assert!(evaluation.tablebase.is_none());

    let json = serde_json::to_value(&evaluation).unwrap();
    assert!(json.get("tablebase").is_none());
}

#[tokio::test]
async fn test_engine_failure_keeps_tablebase_half() {
    let engine = Arc::new(MockEngine::failing());
    let tablebase = Arc::new(
        MockTablebase::new().with(KQK_WHITE, TablebaseEvaluation::from_wdl(2, Some(17), Some(19))),
    );

    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(KQK_WHITE)
        .await;

    assert_eq!(evaluation.engine.score, 0);
    assert_eq!(evaluation.engine.mate, None);
    assert_eq!(evaluation.engine.evaluation, EVALUATION_UNAVAILABLE);

    let tablebase = evaluation.tablebase.unwrap();
    assert_eq!(tablebase.wdl, 2);
    assert_eq!(tablebase.evaluation, "Win in 17");
}

#[tokio::test]
async fn test_black_to_move_is_reported_for_white() {
    let engine = Arc::new(MockEngine::new().with(KQK_BLACK, EngineEvaluation::mate(-6)));
    let probe = TablebaseEvaluation::from_wdl(-2, Some(-12), Some(-11));
    let tablebase = Arc::new(MockTablebase::new().with(KQK_BLACK, probe));

    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(KQK_BLACK)
        .await;

    assert_eq!(evaluation.engine.mate, Some(6));
    assert_eq!(evaluation.engine.evaluation, "M6");

    let tablebase = evaluation.tablebase.unwrap();
    assert_eq!(tablebase.wdl, 2);
    assert_eq!(tablebase.dtz, Some(12));
    assert_eq!(tablebase.dtm, Some(11));
    assert_eq!(tablebase.category, Outcome::Win);
}

#[tokio::test]
async fn test_black_centipawn_score_is_negated() {
    let engine = Arc::new(MockEngine::new().with(AFTER_E4, EngineEvaluation::centipawns(-28)));
    let tablebase = Arc::new(MockTablebase::new());

    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(AFTER_E4)
        .await;

    assert_eq!(evaluation.engine.score, 28);
    assert_eq!(evaluation.engine.evaluation, "+0.3");
    assert!(evaluation.tablebase.is_none());
}

#[tokio::test]
async fn test_repeated_query_is_served_from_cache() {
    let engine = Arc::new(MockEngine::new().with(START, EngineEvaluation::centipawns(20)));
    let tablebase = Arc::new(MockTablebase::new());
    let evaluator = evaluator(&engine, &tablebase);

    let first = evaluator.get_dual_evaluation(START).await;
    let second = evaluator.get_dual_evaluation(START).await;

    assert_eq!(first, second);
    assert_eq!(engine.calls(), 1);
    // "Not covered" is a definitive answer and is cached too
    assert_eq!(tablebase.query_calls(), 1);
}

#[tokio::test]
async fn test_cache_expires_on_manual_clock() {
    let engine = Arc::new(MockEngine::new().with(START, EngineEvaluation::centipawns(20)));
    let tablebase = Arc::new(MockTablebase::new());
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(EvaluationCache::with_clock(
        64,
        Duration::from_secs(60),
        clock.clone(),
    ));
    let evaluator = DualEvaluator::new(engine.clone(), tablebase.clone(), cache);

    evaluator.get_dual_evaluation(START).await;
    clock.advance(Duration::from_secs(59));
    evaluator.get_dual_evaluation(START).await;
    assert_eq!(engine.calls(), 1);
    assert_eq!(tablebase.query_calls(), 1);

    clock.advance(Duration::from_secs(2));
    evaluator.get_dual_evaluation(START).await;
    assert_eq!(engine.calls(), 2);
    assert_eq!(tablebase.query_calls(), 2);
}

#[tokio::test]
async fn test_provider_errors_are_not_cached() {
    let engine = Arc::new(MockEngine::failing());
    let tablebase = Arc::new(MockTablebase::failing());
    let evaluator = evaluator(&engine, &tablebase);

    evaluator.get_dual_evaluation(START).await;
    evaluator.get_dual_evaluation(START).await;

    assert_eq!(engine.calls(), 2);
    assert_eq!(tablebase.query_calls(), 2);
}

#[tokio::test]
async fn test_invalid_fen_never_reaches_providers() {
    let engine = Arc::new(MockEngine::new());
    let tablebase = Arc::new(MockTablebase::new());

    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation("not a position")
        .await;

    assert!(!evaluation.engine.is_available());
    assert!(evaluation.tablebase.is_none());
    assert_eq!(engine.calls(), 0);
    assert_eq!(tablebase.query_calls(), 0);
}

#[tokio::test]
async fn test_cache_stats_track_hits() {
    let engine = Arc::new(MockEngine::new().with(START, EngineEvaluation::centipawns(20)));
    let tablebase = Arc::new(MockTablebase::new());
    let evaluator = evaluator(&engine, &tablebase);

    evaluator.get_dual_evaluation(START).await;
    evaluator.get_dual_evaluation(START).await;

    let stats = evaluator.cache().stats();
    assert_eq!(stats.size, 2);
    assert!(stats.hit_ratio > 0.0);
}

#[tokio::test]
async fn test_engine_and_tablebase_are_queried_concurrently() {
    let delay = Duration::from_millis(200);
    let engine = Arc::new(
        MockEngine::new()
            .with(KQK_WHITE, EngineEvaluation::mate(10))
            .with_delay(delay),
    );
    let tablebase = Arc::new(
        MockTablebase::new()
            .with(KQK_WHITE, TablebaseEvaluation::from_wdl(2, Some(17), Some(19)))
            .with_delay(delay),
    );

    let started = Instant::now();
    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(KQK_WHITE)
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= delay);
    assert!(elapsed < Duration::from_millis(350), "took {:?}", elapsed);
    assert_eq!(evaluation.engine.mate, Some(10));
    assert_eq!(evaluation.tablebase.unwrap().wdl, 2);
}

#[tokio::test]
async fn test_slow_tablebase_failure_keeps_engine_result() {
    let delay = Duration::from_millis(200);
    let engine = Arc::new(
        MockEngine::new()
            .with(START, EngineEvaluation::centipawns(20))
            .with_delay(delay),
    );
    let tablebase = Arc::new(MockTablebase::failing().with_delay(delay));

    let started = Instant::now();
    let evaluation = evaluator(&engine, &tablebase)
        .get_dual_evaluation(START)
        .await;

    assert!(started.elapsed() < Duration::from_millis(350));
    assert_eq!(evaluation.engine.score, 20);
    assert!(evaluation.engine.is_available());
    assert!(evaluation.tablebase.is_none());
    assert_eq!(tablebase.query_calls(), 1);
}
