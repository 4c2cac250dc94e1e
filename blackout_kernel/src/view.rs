/// Blackout Kernel: Player Views
///
/// Read-only projections for front ends: what one seat is allowed to
/// see, and which actions the seat to act may take.

use serde::Serialize;

use crate::cards::Card;
use crate::domain::{GameState, Phase, PlayedCard};
use crate::error::{KernelError, Result};
use crate::rules;
use crate::seats::Seat;

/// Everything visible to `seat`. Other players' hands appear only as sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub phase: Phase,
    pub round: u8,
    pub total_rounds: u8,
    pub tricks_in_round: u8,
    pub dealer: Seat,
    pub trump_card: Option<Card>,
    pub to_act: Option<Seat>,
    pub hand: Vec<Card>,
    pub hand_sizes: Vec<usize>,
    pub bids: Vec<Option<u8>>,
    pub tricks_won: Vec<u8>,
    pub scores: Vec<u32>,
    pub current_trick: Vec<PlayedCard>,
}

impl PlayerView {
    pub fn for_seat(state: &GameState, seat: Seat) -> Result<Self> {
        let me = state.player(seat).ok_or(KernelError::UnknownSeat(seat))?;
        Ok(Self {
            seat,
            phase: state.phase,
            round: state.round,
            total_rounds: rules::total_rounds(state.config.max_tricks.max(1)),
            tricks_in_round: state.tricks_in_round,
            dealer: state.dealer,
            trump_card: state.trump_card,
            to_act: state.to_act,
            hand: me.hand.clone(),
            hand_sizes: state.players.iter().map(|p| p.hand.len()).collect(),
            bids: state.players.iter().map(|p| p.bid).collect(),
            tricks_won: state.players.iter().map(|p| p.tricks_won).collect(),
            scores: state.players.iter().map(|p| p.score).collect(),
            current_trick: state.current_trick.clone(),
        })
    }
}

/// Bids the seat to act may place. Empty outside the bidding phase.
pub fn legal_bids(state: &GameState) -> Vec<u8> {
    let Some(seat) = state.to_act.filter(|_| state.phase == Phase::Bidding) else {
        return Vec::new();
    };
    let is_dealer = seat == state.dealer;
    let others = state.bids_total();
    (0..=state.tricks_in_round)
        .filter(|&b| rules::is_legal_bid(b, state.tricks_in_round, is_dealer, others))
        .collect()
}

/// Cards the seat to act may play. Empty outside the playing phase.
pub fn legal_cards(state: &GameState) -> Vec<Card> {
    match (state.phase, state.to_act.and_then(|s| state.player(s))) {
        (Phase::Playing, Some(player)) => rules::legal_plays(&player.hand, state.led_suit()),
        _ => Vec::new(),
    }
}

/// `(seat, score)` pairs, best first; ties keep seat order.
pub fn standings(state: &GameState) -> Vec<(Seat, u32)> {
    let mut table: Vec<(Seat, u32)> = state.players.iter().map(|p| (p.seat, p.score)).collect();
    table.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    table
}

/// Seats sharing the top score. Empty until the game is over.
pub fn winners(state: &GameState) -> Vec<Seat> {
    if state.phase != Phase::GameOver {
        return Vec::new();
    }
    let best = state.players.iter().map(|p| p.score).max().unwrap_or(0);
    state
        .players
        .iter()
        .filter(|p| p.score == best)
        .map(|p| p.seat)
        .collect()
}
