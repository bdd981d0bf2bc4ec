//! Perspective correction.
//!
//! Providers report everything relative to the side to move. This module is
//! the only place that rebases those values onto White's point of view; every
//! consumer works with [`Normalized`] values afterwards.

use crate::outcome::Outcome;
use crate::types::{EngineEvaluation, TablebaseEvaluation};
use chess::Color;

/// Values that can be viewed from the opposite side of the board.
///
/// `negate` must be self-inverse on every value except `i32::MIN`, which
/// saturates to `i32::MAX`.
pub trait Perspective: Sized {
    fn negate(&self) -> Self;
}

impl Perspective for EngineEvaluation {
    fn negate(&self) -> Self {
        Self {
            score_centipawns: self.score_centipawns.saturating_neg(),
            mate_in: self.mate_in.map(i32::saturating_neg),
        }
    }
}

impl Perspective for TablebaseEvaluation {
    fn negate(&self) -> Self {
        Self {
            wdl: self.wdl.saturating_neg(),
            dtz: self.dtz.map(i32::saturating_neg),
            dtm: self.dtm.map(i32::saturating_neg),
            category: self.category.flipped(),
        }
    }
}

/// A value expressed from White's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized<T> {
    white: T,
}

impl<T> Normalized<T> {
    pub fn white(&self) -> &T {
        &self.white
    }

    pub fn into_inner(self) -> T {
        self.white
    }
}

/// Rebase a side-to-move value onto White's perspective.
pub fn normalize<T: Perspective + Clone>(raw: &T, side_to_move: Color) -> Normalized<T> {
    Normalized {
        white: view_from(raw, side_to_move),
    }
}

/// View a White-perspective value from `color`'s side.
pub fn perspective_of<T: Perspective + Clone>(normalized: &Normalized<T>, color: Color) -> T {
    view_from(&normalized.white, color)
}

fn view_from<T: Perspective + Clone>(value: &T, color: Color) -> T {
    match color {
        Color::White => value.clone(),
        Color::Black => value.negate(),
    }
}

/// `+d.d` / `-d.d` in pawns, rounded half away from zero
pub fn format_score(score_centipawns: i32) -> String {
    let tenths = (score_centipawns.unsigned_abs() + 5) / 10;
    let sign = if score_centipawns < 0 && tenths > 0 {
        '-'
    } else {
        '+'
    };
    format!("{}{}.{}", sign, tenths / 10, tenths % 10)
}

pub fn format_mate(mate_in: i32) -> String {
    format!("M{}", mate_in)
}

/// Category label, with `" in N"` from `|dtz|` when known
pub fn format_tablebase(category: Outcome, dtz: Option<i32>) -> String {
    match dtz {
        Some(dtz) => format!("{} in {}", category.label(), dtz.unsigned_abs()),
        None => category.label().to_string(),
    }
}

/// Display string for a normalized engine evaluation
pub fn format_engine(evaluation: &EngineEvaluation) -> String {
    match evaluation.mate_in {
        Some(mate) => format_mate(mate),
        None => format_score(evaluation.score_centipawns),
    }
}
