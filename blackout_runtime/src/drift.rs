//! Drift detection: determinism verification and state comparison.

use blackout_kernel::domain::GameState;
use blackout_kernel::events::EventEnvelope;

use crate::error::{Result, RuntimeError};
use crate::replay;

/// Verify determinism by replaying the same events twice and
/// comparing hashes.
pub fn verify_determinism(events: &[EventEnvelope]) -> Result<String> {
    let hash1 = replay::rebuild_hash(events)?;
    let hash2 = replay::rebuild_hash(events)?;

    if hash1 != hash2 {
        return Err(RuntimeError::Determinism {
            first: hash1,
            second: hash2,
        });
    }
    Ok(hash1)
}

/// Structured state comparison between two points of a game
/// (or two replays that should agree).
pub fn compare_states(state_a: &GameState, state_b: &GameState) -> DriftReport {
    let score = |s: &GameState, seat: usize| s.player(seat).map_or(0, |p| p.score as i64);
    let seats = state_a.num_players().max(state_b.num_players());

    let score_deltas: Vec<i64> = (0..seats)
        .map(|seat| score(state_b, seat) - score(state_a, seat))
        .collect();
    let changed_hands: Vec<usize> = (0..seats)
        .filter(|&seat| {
            state_a.player(seat).map(|p| &p.hand) != state_b.player(seat).map(|p| &p.hand)
        })
        .collect();

    DriftReport {
        round_a: state_a.round,
        round_b: state_b.round,
        round_delta: state_b.round as i64 - state_a.round as i64,
        phase_a: state_a.phase.as_str(),
        phase_b: state_b.phase.as_str(),
        dealer_a: state_a.dealer,
        dealer_b: state_b.dealer,
        completed_tricks_delta: state_b.completed_tricks.len() as i64
            - state_a.completed_tricks.len() as i64,
        score_deltas,
        changed_hands,
    }
}

/// Structured drift report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub round_a: u8,
    pub round_b: u8,
    pub round_delta: i64,
    pub phase_a: &'static str,
    pub phase_b: &'static str,
    pub dealer_a: usize,
    pub dealer_b: usize,
    pub completed_tricks_delta: i64,
    /// Score change per seat, `b - a`.
    pub score_deltas: Vec<i64>,
    /// Seats whose hand differs.
    pub changed_hands: Vec<usize>,
}

impl DriftReport {
    /// True when nothing the report tracks differs.
    pub fn is_empty(&self) -> bool {
        self.round_delta == 0
            && self.phase_a == self.phase_b
            && self.dealer_a == self.dealer_b
            && self.completed_tricks_delta == 0
            && self.score_deltas.iter().all(|d| *d == 0)
            && self.changed_hands.is_empty()
    }
}
