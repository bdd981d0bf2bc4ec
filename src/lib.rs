//! # Chess Dual Eval
//!
//! Position analysis that combines a heuristic search engine with an exact
//! endgame tablebase.
//!
//! ## Features
//!
//! - **Dual evaluation**: engine score and tablebase verdict side by side, both from
//!   White's perspective
//! - **Critical mistake detection**: sign flips, lost or newly conceded mates, large
//!   regressions and tablebase outcome changes
//! - **Move selection**: best play, longest resistance or human-like play from tablebase
//!   candidates
//! - **Pluggable providers**: a UCI engine process and an HTTP tablebase ship with the
//!   crate; any async implementation works
//! - **Bounded caching**: LRU + TTL memoization with an injectable clock
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chess_dual_eval::{AnalyzerConfig, PositionAnalyzer, SelectOptions, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> chess_dual_eval::Result<()> {
//!     let analyzer = PositionAnalyzer::from_config(&AnalyzerConfig::default())?;
//!
//!     let fen = "8/8/8/8/8/2k5/8/KQ6 w - - 0 1";
//!     let evaluation = analyzer.get_dual_evaluation(fen).await;
//!     println!("{}", evaluation.engine.evaluation);
//!
//!     if let Some(candidate) = analyzer
//!         .select_move(fen, Strategy::LongestResistance, SelectOptions::default())
//!         .await
//!     {
//!         println!("Play {}", candidate.notation);
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod errors;
pub mod utils;

pub use errors::{EvaluationError, Result};

pub mod analyzer;
pub mod config;
pub mod dual_evaluation;
pub mod mistake;
pub mod move_selection;
pub mod normalization;
pub mod outcome;
pub mod providers;
pub mod types;

pub use analyzer::{PositionAnalyzer, SelectOptions};
pub use config::{
    AnalyzerConfig, CacheConfig, LichessConfig, MistakeConfig, SelectionConfig, UciEngineConfig,
};
pub use dual_evaluation::{
    DualEvaluation, DualEvaluator, FormattedEngineEvaluation, FormattedTablebaseEvaluation,
    EVALUATION_UNAVAILABLE,
};
pub use mistake::{is_critical_mistake, Assessment, MistakeDetector};
pub use move_selection::{
    rank, select_best, select_human_like, select_longest_resistance, MoveSelector,
};
pub use normalization::{normalize, perspective_of, Normalized, Perspective};
pub use outcome::{classify, simplify, Outcome, OutcomeBucket};
pub use providers::{EngineProvider, LichessTablebase, NoTablebase, TablebaseProvider, UciEngine};
pub use types::{
    CandidateMove, EngineEvaluation, MistakeReason, MistakeVerdict, Position, Strategy,
    TablebaseEvaluation, TablebaseProbe, TopMoves,
};
pub use utils::cache::{CacheStats, Clock, EvaluationCache, ManualClock, SystemClock};
