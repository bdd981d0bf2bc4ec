use crate::errors::Result;
use crate::outcome::{classify, Outcome};
use chess::{Board, Color};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Engine score for the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineEvaluation {
    pub score_centipawns: i32,
    /// Positive: side to move mates in N. Negative: side to move is mated.
    pub mate_in: Option<i32>,
}

impl EngineEvaluation {
    pub fn centipawns(score_centipawns: i32) -> Self {
        Self {
            score_centipawns,
            mate_in: None,
        }
    }

    pub fn mate(mate_in: i32) -> Self {
        Self {
            score_centipawns: 0,
            mate_in: Some(mate_in),
        }
    }

    pub fn is_mate(&self) -> bool {
        self.mate_in.is_some()
    }
}

/// Tablebase result for the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablebaseEvaluation {
    pub wdl: i32,
    pub dtz: Option<i32>,
    pub dtm: Option<i32>,
    pub category: Outcome,
}

impl TablebaseEvaluation {
    /// Build from a WDL value, deriving the category from it
    pub fn from_wdl(wdl: i32, dtz: Option<i32>, dtm: Option<i32>) -> Self {
        Self {
            wdl,
            dtz,
            dtm,
            category: classify(wdl),
        }
    }
}

/// A position identified by FEN, with the side to move read from it
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub fen: String,
    pub side_to_move: Color,
}

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self> {
        let board = Board::from_str(fen)?;
        Ok(Self {
            fen: fen.to_string(),
            side_to_move: board.side_to_move(),
        })
    }
}

/// A ranked tablebase move.
///
/// `wdl`, `dtz` and `dtm` are from the perspective of the side to move
/// before the candidate is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMove {
    /// UCI notation
    pub notation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
    pub wdl: i32,
    pub dtz: Option<i32>,
    pub dtm: Option<i32>,
}

impl CandidateMove {
    pub fn new(notation: &str, wdl: i32, dtz: Option<i32>, dtm: Option<i32>) -> Self {
        Self {
            notation: notation.to_string(),
            san: None,
            wdl,
            dtz,
            dtm,
        }
    }

    pub fn outcome(&self) -> Outcome {
        classify(self.wdl)
    }
}

/// Answer to "is this position in the tablebase?"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TablebaseProbe {
    pub is_tablebase_position: bool,
    pub result: Option<TablebaseEvaluation>,
}

impl TablebaseProbe {
    pub fn not_covered() -> Self {
        Self::default()
    }

    pub fn covered(result: TablebaseEvaluation) -> Self {
        Self {
            is_tablebase_position: true,
            result: Some(result),
        }
    }

    /// The result, if the position is covered
    pub fn into_result(self) -> Option<TablebaseEvaluation> {
        if self.is_tablebase_position {
            self.result
        } else {
            None
        }
    }
}

/// Ranked candidate moves from the tablebase, best first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopMoves {
    pub is_available: bool,
    pub moves: Vec<CandidateMove>,
}

impl TopMoves {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Why a move was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MistakeReason {
    SignFlip,
    LostForcedMate,
    NewlyFacingMate,
    ScoreRegression,
    OutcomeChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MistakeVerdict {
    pub is_critical_mistake: bool,
    pub reason: Option<MistakeReason>,
}

impl MistakeVerdict {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn mistake(reason: MistakeReason) -> Self {
        Self {
            is_critical_mistake: true,
            reason: Some(reason),
        }
    }
}

/// How [`crate::PositionAnalyzer::select_move`] picks among candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Highest WDL, fastest conversion
    Best,
    /// Fastest win when winning, longest defence when losing
    LongestResistance,
    /// Best move with probability `strength`, otherwise one of the top few
    HumanLike { strength: f64 },
}
