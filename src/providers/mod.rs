//! Evaluation sources consumed as black boxes.
//!
//! The composer only sees these two traits, so any transport works: a local
//! UCI process ([`uci::UciEngine`]), an HTTP tablebase
//! ([`lichess::LichessTablebase`]), or an in-process mock.

pub mod lichess;
pub mod uci;

pub use lichess::LichessTablebase;
pub use uci::UciEngine;

use crate::errors::Result;
use crate::types::{EngineEvaluation, TablebaseProbe, TopMoves};
use std::future::Future;
use std::sync::Arc;

/// Heuristic search engine. Scores are relative to the side to move.
pub trait EngineProvider: Send + Sync {
    fn evaluate_position(
        &self,
        fen: &str,
    ) -> impl Future<Output = Result<EngineEvaluation>> + Send;

    /// A slower, deeper search used to settle tablebase-range scores
    fn evaluate_position_deep(
        &self,
        fen: &str,
    ) -> impl Future<Output = Result<EngineEvaluation>> + Send {
        self.evaluate_position(fen)
    }
}

/// Exact endgame tablebase. Results are relative to the side to move.
pub trait TablebaseProvider: Send + Sync {
    fn query_position(&self, fen: &str) -> impl Future<Output = Result<TablebaseProbe>> + Send;

    /// Up to `n` candidate moves, best first
    fn get_top_moves(&self, fen: &str, n: usize) -> impl Future<Output = Result<TopMoves>> + Send;

    /// Position result and candidates together. Backends that answer both from one
    /// request should override this.
    fn query_with_moves(
        &self,
        fen: &str,
        n: usize,
    ) -> impl Future<Output = Result<(TablebaseProbe, TopMoves)>> + Send {
        async move {
            let (probe, moves) =
                tokio::join!(self.query_position(fen), self.get_top_moves(fen, n));
            Ok((probe?, moves?))
        }
    }
}

impl<T: EngineProvider> EngineProvider for Arc<T> {
    fn evaluate_position(
        &self,
        fen: &str,
    ) -> impl Future<Output = Result<EngineEvaluation>> + Send {
        (**self).evaluate_position(fen)
    }

    fn evaluate_position_deep(
        &self,
        fen: &str,
    ) -> impl Future<Output = Result<EngineEvaluation>> + Send {
        (**self).evaluate_position_deep(fen)
    }
}

impl<T: TablebaseProvider> TablebaseProvider for Arc<T> {
    fn query_position(&self, fen: &str) -> impl Future<Output = Result<TablebaseProbe>> + Send {
        (**self).query_position(fen)
    }

    fn get_top_moves(&self, fen: &str, n: usize) -> impl Future<Output = Result<TopMoves>> + Send {
        (**self).get_top_moves(fen, n)
    }

    fn query_with_moves(
        &self,
        fen: &str,
        n: usize,
    ) -> impl Future<Output = Result<(TablebaseProbe, TopMoves)>> + Send {
        (**self).query_with_moves(fen, n)
    }
}

/// Tablebase that covers nothing, for engine-only setups
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTablebase;

impl TablebaseProvider for NoTablebase {
    async fn query_position(&self, _fen: &str) -> Result<TablebaseProbe> {
        Ok(TablebaseProbe::not_covered())
    }

    async fn get_top_moves(&self, _fen: &str, _n: usize) -> Result<TopMoves> {
        Ok(TopMoves::unavailable())
    }
}
