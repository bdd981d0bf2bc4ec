//! Tablebase move selection.
//!
//! Candidates carry WDL/DTZ/DTM from the mover's perspective. Selection never
//! fails: an empty or unavailable candidate list yields `None`.

use crate::types::{CandidateMove, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::{Ordering, Reverse};

/// Candidates sampled by human-like play when it does not pick the best move
pub const DEFAULT_HUMAN_LIKE_POOL: usize = 3;

fn compare_best(a: &CandidateMove, b: &CandidateMove) -> Ordering {
    b.wdl.cmp(&a.wdl).then_with(|| match (a.dtz, b.dtz) {
        (Some(a), Some(b)) => a.unsigned_abs().cmp(&b.unsigned_abs()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

/// Order candidates best first: highest WDL, then shortest DTZ.
/// Candidates without DTZ go last within their WDL; other ties keep input order.
pub fn rank(candidates: &[CandidateMove]) -> Vec<&CandidateMove> {
    let mut ranked: Vec<&CandidateMove> = candidates.iter().collect();
    ranked.sort_by(|a, b| compare_best(a, b));
    ranked
}

pub fn select_best(candidates: &[CandidateMove]) -> Option<CandidateMove> {
    candidates
        .iter()
        .min_by(|a, b| compare_best(a, b))
        .cloned()
}

/// Fastest win when winning, longest defence when losing, any drawing move
/// when drawn. Other positions, or no candidate keeping the result, fall
/// back to [`select_best`].
pub fn select_longest_resistance(
    candidates: &[CandidateMove],
    position_wdl: i32,
) -> Option<CandidateMove> {
    let choice = match position_wdl {
        2 => candidates
            .iter()
            .filter(|c| c.wdl == 2)
            .min_by_key(|c| (c.dtz.is_none(), c.dtz.map(i32::unsigned_abs))),
        // Longest mate first, then longest DTZ. Without any DTM this is DTZ alone.
        -2 => candidates
            .iter()
            .filter(|c| c.wdl == -2)
            .min_by_key(|c| {
                Reverse((c.dtm.map(i32::unsigned_abs), c.dtz.map(i32::unsigned_abs)))
            }),
        0 => candidates.iter().find(|c| c.wdl == 0),
        _ => None,
    };

    match choice {
        Some(candidate) => Some(candidate.clone()),
        None => select_best(candidates),
    }
}

/// Best move with probability `strength`, otherwise a uniform pick among the
/// top [`DEFAULT_HUMAN_LIKE_POOL`] ranked candidates
pub fn select_human_like<R: Rng + ?Sized>(
    candidates: &[CandidateMove],
    strength: f64,
    rng: &mut R,
) -> Option<CandidateMove> {
    select_human_like_from_pool(candidates, strength, DEFAULT_HUMAN_LIKE_POOL, rng)
}

pub fn select_human_like_from_pool<R: Rng + ?Sized>(
    candidates: &[CandidateMove],
    strength: f64,
    pool: usize,
    rng: &mut R,
) -> Option<CandidateMove> {
    if candidates.is_empty() {
        return None;
    }

    let strength = if strength.is_nan() {
        1.0
    } else {
        strength.clamp(0.0, 1.0)
    };

    if rng.gen_bool(strength) {
        return select_best(candidates);
    }

    let ranked = rank(candidates);
    let pool = &ranked[..pool.clamp(1, ranked.len())];
    pool.choose(rng).map(|c| (*c).clone())
}

/// Strategy dispatch with a configurable human-like pool
#[derive(Debug, Clone, Copy)]
pub struct MoveSelector {
    human_like_pool: usize,
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new(DEFAULT_HUMAN_LIKE_POOL)
    }
}

impl MoveSelector {
    pub fn new(human_like_pool: usize) -> Self {
        Self { human_like_pool }
    }

    pub fn select<R: Rng + ?Sized>(
        &self,
        candidates: &[CandidateMove],
        position_wdl: i32,
        strategy: Strategy,
        rng: &mut R,
    ) -> Option<CandidateMove> {
        match strategy {
            Strategy::Best => select_best(candidates),
            Strategy::LongestResistance => select_longest_resistance(candidates, position_wdl),
            Strategy::HumanLike { strength } => {
                select_human_like_from_pool(candidates, strength, self.human_like_pool, rng)
            }
        }
    }
}
