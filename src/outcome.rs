//! Tablebase outcome vocabulary.
//!
//! Maps discrete WDL values (and the category strings online tablebases
//! report) onto a closed enum, plus the coarse 3-way bucket used to decide
//! whether a move changed the theoretical result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Win/Draw/Loss outcome for the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    /// Win that the fifty-move rule turns into a draw
    CursedWin,
    Draw,
    /// Loss that the fifty-move rule saves as a draw
    BlessedLoss,
    Loss,
    Unknown,
}

/// Coarse result bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutcomeBucket {
    Loss,
    Draw,
    Win,
}

/// Map a WDL value onto an [`Outcome`].
pub fn classify(wdl: i32) -> Outcome {
    match wdl {
        2 => Outcome::Win,
        1 => Outcome::CursedWin,
        0 => Outcome::Draw,
        -1 => Outcome::BlessedLoss,
        -2 => Outcome::Loss,
        _ => Outcome::Unknown,
    }
}

/// Bucket an outcome for "did the result change" checks.
///
/// Cursed wins count as wins and blessed losses as losses. `Unknown` has no
/// bucket, so it can never register as a change.
pub fn simplify(outcome: Outcome) -> Option<OutcomeBucket> {
    match outcome {
        Outcome::Win | Outcome::CursedWin => Some(OutcomeBucket::Win),
        Outcome::Draw => Some(OutcomeBucket::Draw),
        Outcome::Loss | Outcome::BlessedLoss => Some(OutcomeBucket::Loss),
        Outcome::Unknown => None,
    }
}

impl Outcome {
    /// WDL value for this outcome, `None` for `Unknown`
    pub fn wdl(self) -> Option<i32> {
        match self {
            Outcome::Win => Some(2),
            Outcome::CursedWin => Some(1),
            Outcome::Draw => Some(0),
            Outcome::BlessedLoss => Some(-1),
            Outcome::Loss => Some(-2),
            Outcome::Unknown => None,
        }
    }

    /// The same result seen from the other side of the board
    pub fn flipped(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::CursedWin => Outcome::BlessedLoss,
            Outcome::Draw => Outcome::Draw,
            Outcome::BlessedLoss => Outcome::CursedWin,
            Outcome::Loss => Outcome::Win,
            Outcome::Unknown => Outcome::Unknown,
        }
    }

    /// Parse a provider category string.
    ///
    /// `maybe-*` and `syzygy-*` are the rounding-ambiguous categories some
    /// online tablebases report; they collapse onto the plain result.
    pub fn from_category(category: &str) -> Self {
        match category {
            "win" | "maybe-win" | "syzygy-win" => Outcome::Win,
            "cursed-win" => Outcome::CursedWin,
            "draw" => Outcome::Draw,
            "blessed-loss" => Outcome::BlessedLoss,
            "loss" | "maybe-loss" | "syzygy-loss" => Outcome::Loss,
            _ => Outcome::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::CursedWin => "Cursed Win",
            Outcome::Draw => "Draw",
            Outcome::BlessedLoss => "Blessed Loss",
            Outcome::Loss => "Loss",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(2), Outcome::Win);
        assert_eq!(classify(1), Outcome::CursedWin);
        assert_eq!(classify(0), Outcome::Draw);
        assert_eq!(classify(-1), Outcome::BlessedLoss);
        assert_eq!(classify(-2), Outcome::Loss);
        assert_eq!(classify(3), Outcome::Unknown);
        assert_eq!(classify(-7), Outcome::Unknown);
    }

    #[test]
    fn test_wdl_inverts_classify() {
        for wdl in -2..=2 {
            assert_eq!(classify(wdl).wdl(), Some(wdl));
        }
        assert_eq!(Outcome::Unknown.wdl(), None);
    }

    #[test]
    fn test_simplify_buckets() {
        assert_eq!(simplify(Outcome::CursedWin), Some(OutcomeBucket::Win));
        assert_eq!(simplify(Outcome::BlessedLoss), Some(OutcomeBucket::Loss));
        assert_eq!(simplify(Outcome::Draw), Some(OutcomeBucket::Draw));
        assert_eq!(simplify(Outcome::Unknown), None);
        assert!(OutcomeBucket::Win > OutcomeBucket::Draw);
        assert!(OutcomeBucket::Draw > OutcomeBucket::Loss);
    }

    #[test]
    fn test_flipped_is_involution() {
        let all = [
            Outcome::Win,
            Outcome::CursedWin,
            Outcome::Draw,
            Outcome::BlessedLoss,
            Outcome::Loss,
            Outcome::Unknown,
        ];
        for outcome in all {
            assert_eq!(outcome.flipped().flipped(), outcome);
        }
        assert_eq!(Outcome::CursedWin.flipped(), Outcome::BlessedLoss);
    }

    #[test]
    fn test_from_category() {
        assert_eq!(Outcome::from_category("win"), Outcome::Win);
        assert_eq!(Outcome::from_category("syzygy-loss"), Outcome::Loss);
        assert_eq!(Outcome::from_category("blessed-loss"), Outcome::BlessedLoss);
        assert_eq!(Outcome::from_category("unknown"), Outcome::Unknown);
        assert_eq!(Outcome::from_category("WIN"), Outcome::Unknown);
    }
}
