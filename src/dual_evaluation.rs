//! Engine + tablebase evaluation composer.
//!
//! Both sources are queried concurrently and independently. An engine failure
//! degrades to a visible "unavailable" sentinel; a tablebase failure or an
//! uncovered position simply leaves the tablebase half empty.

use crate::errors::Result;
use crate::normalization::{format_engine, format_tablebase, normalize, Normalized};
use crate::outcome::Outcome;
use crate::providers::{EngineProvider, TablebaseProvider};
use crate::types::{EngineEvaluation, Position, TablebaseEvaluation, TopMoves};
use crate::utils::cache::EvaluationCache;
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

pub const EVALUATION_UNAVAILABLE: &str = "Evaluation unavailable";

/// Engine half of a [`DualEvaluation`], White's perspective
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedEngineEvaluation {
    pub score: i32,
    pub mate: Option<i32>,
    pub evaluation: String,
}

impl FormattedEngineEvaluation {
    pub fn unavailable() -> Self {
        Self {
            score: 0,
            mate: None,
            evaluation: EVALUATION_UNAVAILABLE.to_string(),
        }
    }

    pub fn from_normalized(normalized: &Normalized<EngineEvaluation>) -> Self {
        let white = normalized.white();
        Self {
            score: white.score_centipawns,
            mate: white.mate_in,
            evaluation: format_engine(white),
        }
    }

    pub fn is_available(&self) -> bool {
        self.evaluation != EVALUATION_UNAVAILABLE
    }
}

/// Tablebase half of a [`DualEvaluation`], White's perspective
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedTablebaseEvaluation {
    pub wdl: i32,
    pub dtz: Option<i32>,
    pub dtm: Option<i32>,
    pub category: Outcome,
    pub evaluation: String,
}

impl FormattedTablebaseEvaluation {
    pub fn from_normalized(normalized: &Normalized<TablebaseEvaluation>) -> Self {
        let white = normalized.white();
        Self {
            wdl: white.wdl,
            dtz: white.dtz,
            dtm: white.dtm,
            category: white.category,
            evaluation: format_tablebase(white.category, white.dtz),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DualEvaluation {
    pub engine: FormattedEngineEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tablebase: Option<FormattedTablebaseEvaluation>,
}

impl DualEvaluation {
    fn unavailable() -> Self {
        Self {
            engine: FormattedEngineEvaluation::unavailable(),
            tablebase: None,
        }
    }
}

/// Cache-backed access to both providers
pub struct DualEvaluator<E, T> {
    engine: E,
    tablebase: T,
    cache: Arc<EvaluationCache>,
}

impl<E, T> DualEvaluator<E, T>
where
    E: EngineProvider,
    T: TablebaseProvider,
{
    pub fn new(engine: E, tablebase: T, cache: Arc<EvaluationCache>) -> Self {
        Self {
            engine,
            tablebase,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<EvaluationCache> {
        &self.cache
    }

    /// Raw engine evaluation, side-to-move perspective
    pub async fn engine_evaluation(&self, fen: &str) -> Result<EngineEvaluation> {
        if let Some(cached) = self.cache.get_engine(fen) {
            debug!("Engine cache hit for {}", fen);
            return Ok(cached);
        }

        let evaluation = self.engine.evaluate_position(fen).await?;
        self.cache.store_engine(fen, evaluation);
        Ok(evaluation)
    }

    /// Deep engine evaluation. Never served from or written to the cache.
    pub async fn deep_engine_evaluation(&self, fen: &str) -> Result<EngineEvaluation> {
        self.engine.evaluate_position_deep(fen).await
    }

    /// Raw tablebase result, `None` when the position is not covered
    pub async fn tablebase_evaluation(&self, fen: &str) -> Result<Option<TablebaseEvaluation>> {
        if let Some(cached) = self.cache.get_tablebase(fen) {
            debug!("Tablebase cache hit for {}", fen);
            return Ok(cached);
        }

        let result = self.tablebase.query_position(fen).await?.into_result();
        self.cache.store_tablebase(fen, result);
        Ok(result)
    }

    pub async fn top_moves(&self, fen: &str, n: usize) -> Result<TopMoves> {
        if let Some(cached) = self.cache.get_top_moves(fen, n) {
            return Ok(cached);
        }

        let moves = self.tablebase.get_top_moves(fen, n).await?;
        self.cache.store_top_moves(fen, n, moves.clone());
        Ok(moves)
    }

    /// Tablebase result and candidate moves together. Missing halves are fetched
    /// in a single provider call when neither is cached.
    pub async fn tablebase_with_moves(
        &self,
        fen: &str,
        n: usize,
    ) -> Result<(Option<TablebaseEvaluation>, TopMoves)> {
        match (self.cache.get_tablebase(fen), self.cache.get_top_moves(fen, n)) {
            (Some(result), Some(moves)) => Ok((result, moves)),
            (Some(result), None) => Ok((result, self.top_moves(fen, n).await?)),
            (None, Some(moves)) => Ok((self.tablebase_evaluation(fen).await?, moves)),
            (None, None) => {
                let (probe, moves) = self.tablebase.query_with_moves(fen, n).await?;
                let result = probe.into_result();
                self.cache.store_tablebase(fen, result);
                self.cache.store_top_moves(fen, n, moves.clone());
                Ok((result, moves))
            }
        }
    }

    /// Both evaluations of `fen`, rebased onto White. Never fails.
    pub async fn get_dual_evaluation(&self, fen: &str) -> DualEvaluation {
        let position = match Position::from_fen(fen) {
            Ok(position) => position,
            Err(e) => {
                warn!("Cannot evaluate {}: {}", fen, e);
                return DualEvaluation::unavailable();
            }
        };

        let (engine, tablebase) = tokio::join!(
            self.engine_evaluation(fen),
            self.tablebase_evaluation(fen)
        );

        let engine = match engine {
            Ok(raw) => {
                FormattedEngineEvaluation::from_normalized(&normalize(&raw, position.side_to_move))
            }
            Err(e) => {
                warn!("Engine evaluation failed for {}: {}", fen, e);
                FormattedEngineEvaluation::unavailable()
            }
        };

        let tablebase = match tablebase {
            Ok(Some(raw)) => Some(FormattedTablebaseEvaluation::from_normalized(&normalize(
                &raw,
                position.side_to_move,
            ))),
            Ok(None) => None,
            Err(e) => {
                debug!("Tablebase unavailable for {}: {}", fen, e);
                None
            }
        };

        DualEvaluation { engine, tablebase }
    }
}
