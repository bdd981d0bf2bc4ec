//! Critical mistake detection.
//!
//! A move is a critical mistake when it throws away the mover's result: the
//! evaluation swings against the mover, a forced mate is lost, a mate against
//! the mover appears, or the score drops by more than the regression
//! threshold. Every predicate is judged from the mover's side after both
//! evaluations have been rebased onto White.

use crate::config::MistakeConfig;
use crate::dual_evaluation::DualEvaluator;
use crate::errors::Result;
use crate::normalization::{normalize, perspective_of, Normalized};
use crate::outcome::simplify;
use crate::providers::{EngineProvider, TablebaseProvider};
use crate::types::{
    EngineEvaluation, MistakeReason, MistakeVerdict, Position, TablebaseEvaluation,
};
use chess::Color;
use log::{debug, warn};

/// Result of judging a move without access to an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    Decided(MistakeVerdict),
    /// A score is in tablebase range; needs a deep re-analysis to decide
    Saturated,
}

fn is_saturated(evaluation: &EngineEvaluation, config: &MistakeConfig) -> bool {
    evaluation.mate_in.is_none()
        && evaluation.score_centipawns.saturating_abs() > config.saturation_cp
}

/// Sign of the evaluation, and whether it clears the noise floor.
/// Mates always clear it (a mate of 0 has no sign).
fn signal(evaluation: &EngineEvaluation, config: &MistakeConfig) -> (i32, bool) {
    match evaluation.mate_in {
        Some(mate) => (mate.signum(), mate != 0),
        None => (
            evaluation.score_centipawns.signum(),
            evaluation.score_centipawns.saturating_abs() > config.noise_floor_cp,
        ),
    }
}

/// Apply the four predicates to White-perspective evaluations.
pub fn judge(
    before: &Normalized<EngineEvaluation>,
    after: &Normalized<EngineEvaluation>,
    mover: Color,
    config: &MistakeConfig,
) -> MistakeVerdict {
    let before = perspective_of(before, mover);
    let after = perspective_of(after, mover);

    let had_mate = before.mate_in.is_some_and(|m| m > 0);
    let being_mated_before = before.mate_in.is_some_and(|m| m < 0);
    let being_mated_after = after.mate_in.is_some_and(|m| m < 0);

    if had_mate && after.mate_in.is_none() {
        return MistakeVerdict::mistake(MistakeReason::LostForcedMate);
    }

    if !being_mated_before && being_mated_after {
        return MistakeVerdict::mistake(MistakeReason::NewlyFacingMate);
    }

    let (sign_before, clear_before) = signal(&before, config);
    let (sign_after, clear_after) = signal(&after, config);
    if sign_before > 0 && sign_after < 0 && clear_before && clear_after {
        return MistakeVerdict::mistake(MistakeReason::SignFlip);
    }

    if !before.is_mate()
        && !after.is_mate()
        && before
            .score_centipawns
            .saturating_sub(after.score_centipawns)
            > config.regression_threshold_cp
    {
        return MistakeVerdict::mistake(MistakeReason::ScoreRegression);
    }

    MistakeVerdict::clean()
}

/// Rebase raw provider scores and judge the move when no deep analysis is
/// needed. `raw_after` is relative to the opponent, who moves next.
pub fn assess(
    raw_before: &EngineEvaluation,
    raw_after: &EngineEvaluation,
    side_to_move_before: Color,
    config: &MistakeConfig,
) -> Assessment {
    let before = normalize(raw_before, side_to_move_before);
    let after = normalize(raw_after, !side_to_move_before);

    if is_saturated(before.white(), config) || is_saturated(after.white(), config) {
        return Assessment::Saturated;
    }

    Assessment::Decided(judge(&before, &after, side_to_move_before, config))
}

/// Engine-free verdict. A saturated score cannot be settled here and counts
/// as no mistake.
pub fn is_critical_mistake(
    raw_before: &EngineEvaluation,
    raw_after: &EngineEvaluation,
    side_to_move_before: Color,
    config: &MistakeConfig,
) -> bool {
    match assess(raw_before, raw_after, side_to_move_before, config) {
        Assessment::Decided(verdict) => verdict.is_critical_mistake,
        Assessment::Saturated => false,
    }
}

/// Whether the mover's theoretical result got worse (Win → Draw, Draw → Loss, ...).
///
/// Uses the 3-way bucket, so Win → Cursed Win is not a change.
pub fn outcome_regressed(
    before: &Normalized<TablebaseEvaluation>,
    after: &Normalized<TablebaseEvaluation>,
    mover: Color,
) -> bool {
    let before = simplify(perspective_of(before, mover).category);
    let after = simplify(perspective_of(after, mover).category);
    match (before, after) {
        (Some(before), Some(after)) => after < before,
        _ => false,
    }
}

/// Provider-backed detector
#[derive(Debug, Clone, Default)]
pub struct MistakeDetector {
    config: MistakeConfig,
}

impl MistakeDetector {
    pub fn new(config: MistakeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MistakeConfig {
        &self.config
    }

    /// Judge the move that turned `fen_before` into `fen_after`.
    ///
    /// Engine errors propagate; tablebase errors only disable the outcome
    /// check. A deep re-analysis that overruns its timer yields a clean
    /// verdict.
    pub async fn mistake_verdict<E, T>(
        &self,
        evaluator: &DualEvaluator<E, T>,
        fen_before: &str,
        fen_after: &str,
    ) -> Result<MistakeVerdict>
    where
        E: EngineProvider,
        T: TablebaseProvider,
    {
        let mover = Position::from_fen(fen_before)?.side_to_move;

        let (engine_before, engine_after, tb_before, tb_after) = tokio::join!(
            evaluator.engine_evaluation(fen_before),
            evaluator.engine_evaluation(fen_after),
            evaluator.tablebase_evaluation(fen_before),
            evaluator.tablebase_evaluation(fen_after),
        );
        let (engine_before, engine_after) = (engine_before?, engine_after?);

        if let (Ok(Some(tb_before)), Ok(Some(tb_after))) = (tb_before, tb_after) {
            let before = normalize(&tb_before, mover);
            let after = normalize(&tb_after, !mover);
            if outcome_regressed(&before, &after, mover) {
                return Ok(MistakeVerdict::mistake(MistakeReason::OutcomeChanged));
            }
        }

        match assess(&engine_before, &engine_after, mover, &self.config) {
            Assessment::Decided(verdict) => Ok(verdict),
            Assessment::Saturated => {
                self.deep_verdict(evaluator, fen_before, fen_after, mover)
                    .await
            }
        }
    }

    async fn deep_verdict<E, T>(
        &self,
        evaluator: &DualEvaluator<E, T>,
        fen_before: &str,
        fen_after: &str,
        mover: Color,
    ) -> Result<MistakeVerdict>
    where
        E: EngineProvider,
        T: TablebaseProvider,
    {
        debug!("Tablebase-range score, re-analysing {} deeply", fen_before);

        let deep = tokio::time::timeout(self.config.deep_analysis_timeout(), async {
            tokio::join!(
                evaluator.deep_engine_evaluation(fen_before),
                evaluator.deep_engine_evaluation(fen_after),
            )
        })
        .await;

        match deep {
            Ok((before, after)) => {
                let before = normalize(&before?, mover);
                let after = normalize(&after?, !mover);
                Ok(judge(&before, &after, mover, &self.config))
            }
            Err(_) => {
                warn!(
                    "Deep analysis of {} exceeded {}ms, assuming no mistake",
                    fen_before, self.config.deep_analysis_timeout_ms
                );
                Ok(MistakeVerdict::clean())
            }
        }
    }

    /// Fail-open wrapper around [`MistakeDetector::mistake_verdict`]
    pub async fn is_critical_mistake<E, T>(
        &self,
        evaluator: &DualEvaluator<E, T>,
        fen_before: &str,
        fen_after: &str,
    ) -> bool
    where
        E: EngineProvider,
        T: TablebaseProvider,
    {
        match self.mistake_verdict(evaluator, fen_before, fen_after).await {
            Ok(verdict) => verdict.is_critical_mistake,
            Err(e) => {
                warn!("Mistake check failed for {}: {}", fen_before, e);
                false
            }
        }
    }
}
