//! Public entry point tying the composer, detector and selector together.
//!
//! None of the methods here return errors; failures are logged and mapped to
//! a safe default.

use crate::config::AnalyzerConfig;
use crate::dual_evaluation::{DualEvaluation, DualEvaluator};
use crate::errors::Result;
use crate::mistake::MistakeDetector;
use crate::move_selection::MoveSelector;
use crate::providers::{EngineProvider, LichessTablebase, TablebaseProvider, UciEngine};
use crate::types::{CandidateMove, MistakeVerdict, Position, Strategy};
use crate::utils::cache::{CacheStats, EvaluationCache};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Per-call knobs for [`PositionAnalyzer::select_move`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Candidates to request; the configured default when `None`
    pub top_moves: Option<usize>,
    /// Seed for human-like sampling; entropy when `None`
    pub seed: Option<u64>,
}

pub struct PositionAnalyzer<E, T> {
    evaluator: DualEvaluator<E, T>,
    detector: MistakeDetector,
    selector: MoveSelector,
    top_moves: usize,
}

impl PositionAnalyzer<UciEngine, LichessTablebase> {
    /// Local UCI engine plus the HTTP tablebase described by `config`
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let engine = UciEngine::new(config.engine.clone());
        let tablebase = LichessTablebase::new(&config.tablebase)?;
        Ok(Self::new(engine, tablebase, config))
    }
}

impl<E, T> PositionAnalyzer<E, T>
where
    E: EngineProvider,
    T: TablebaseProvider,
{
    pub fn new(engine: E, tablebase: T, config: &AnalyzerConfig) -> Self {
        let cache = Arc::new(EvaluationCache::new(
            config.cache.capacity,
            config.cache.ttl(),
        ));
        Self::with_cache(engine, tablebase, cache, config)
    }

    /// Share an existing cache, e.g. one driven by a manual clock
    pub fn with_cache(
        engine: E,
        tablebase: T,
        cache: Arc<EvaluationCache>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            evaluator: DualEvaluator::new(engine, tablebase, cache),
            detector: MistakeDetector::new(config.mistake.clone()),
            selector: MoveSelector::new(config.selection.human_like_pool),
            top_moves: config.selection.top_moves,
        }
    }

    pub fn evaluator(&self) -> &DualEvaluator<E, T> {
        &self.evaluator
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.evaluator.cache().stats()
    }

    pub async fn get_dual_evaluation(&self, fen: &str) -> DualEvaluation {
        self.evaluator.get_dual_evaluation(fen).await
    }

    pub async fn is_critical_mistake(&self, fen_before: &str, fen_after: &str) -> bool {
        self.detector
            .is_critical_mistake(&self.evaluator, fen_before, fen_after)
            .await
    }

    /// Verdict with its reason; a clean verdict on any failure
    pub async fn mistake_verdict(&self, fen_before: &str, fen_after: &str) -> MistakeVerdict {
        match self
            .detector
            .mistake_verdict(&self.evaluator, fen_before, fen_after)
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Mistake check failed for {}: {}", fen_before, e);
                MistakeVerdict::clean()
            }
        }
    }

    /// Pick a tablebase move for `fen`. `None` outside tablebase range or on
    /// any failure.
    pub async fn select_move(
        &self,
        fen: &str,
        strategy: Strategy,
        opts: SelectOptions,
    ) -> Option<CandidateMove> {
        if let Err(e) = Position::from_fen(fen) {
            warn!("Cannot select a move for {}: {}", fen, e);
            return None;
        }

        let n = opts.top_moves.unwrap_or(self.top_moves);
        let (position, top) = match self.evaluator.tablebase_with_moves(fen, n).await {
            Ok((Some(position), top)) => (position, top),
            Ok((None, _)) => {
                debug!("{} is not a tablebase position", fen);
                return None;
            }
            Err(e) => {
                warn!("Tablebase query failed for {}: {}", fen, e);
                return None;
            }
        };

        if !top.is_available {
            debug!("No candidate moves for {}", fen);
            return None;
        }

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let choice = self
            .selector
            .select(&top.moves, position.wdl, strategy, &mut rng);
        debug!("{:?} selected {:?} for {}", strategy, choice, fen);
        choice
    }
}
