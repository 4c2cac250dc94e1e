/// Blackout Kernel: Rules of the Variant
///
///   (a) the first round has one trick
///   (b) tricks grow by one per round up to `max_tricks`
///   (c) then shrink by one per round down to a final one-trick round
///   (d) the dealer bids last and may not make the bids total the tricks
///   (e) the dealer moves left every round
///   (f) 10 points for making the bid exactly, plus 1 per trick taken

use crate::cards::{Card, Suit, DECK_SIZE};
use crate::error::{KernelError, Result};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = DECK_SIZE;
/// Upper bound accepted for the requested `max_tricks`.
pub const MAX_TRICKS_LIMIT: u8 = 13;
pub const DEFAULT_MAX_TRICKS: u8 = 7;
pub const BID_BONUS: u32 = 10;
pub const POINTS_PER_TRICK: u32 = 1;

/// Validate the table size and requested trick ceiling, lowering the
/// ceiling when the deck cannot cover `num_players * max_tricks` cards.
pub fn effective_max_tricks(num_players: usize, requested: u8) -> Result<u8> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
        return Err(KernelError::InvalidConfig(format!(
            "num_players={} must be between {} and {}",
            num_players, MIN_PLAYERS, MAX_PLAYERS
        )));
    }
    if requested == 0 || requested > MAX_TRICKS_LIMIT {
        return Err(KernelError::InvalidConfig(format!(
            "max_tricks={} must be between 1 and {}",
            requested, MAX_TRICKS_LIMIT
        )));
    }
    if num_players * requested as usize > DECK_SIZE {
        return Ok((DECK_SIZE / num_players) as u8);
    }
    Ok(requested)
}

/// Rounds in a full game: up to the ceiling and back down again.
///
/// Saturates instead of overflowing; valid ceilings are 1..=13.
pub fn total_rounds(max_tricks: u8) -> u8 {
    max_tricks.saturating_mul(2).saturating_sub(1)
}

/// Tricks (and cards per hand) in 1-based `round`.
pub fn tricks_in_round(round: u8, max_tricks: u8) -> u8 {
    if round <= max_tricks {
        round
    } else {
        max_tricks.saturating_mul(2).saturating_sub(round)
    }
}

/// The one bid the dealer may not make, given the sum of every other bid.
/// `None` when the others already overbid the round.
pub fn forbidden_dealer_bid(tricks: u8, others_total: u32) -> Option<u8> {
    (others_total <= tricks as u32).then(|| tricks - others_total as u8)
}

/// Check a bid against the round's trick count and, for the dealer, the
/// total-bids rule.
pub fn is_legal_bid(bid: u8, tricks: u8, is_dealer: bool, others_total: u32) -> bool {
    if bid > tricks {
        return false;
    }
    !(is_dealer && forbidden_dealer_bid(tricks, others_total) == Some(bid))
}

/// Points for one round.
pub fn round_score(bid: u8, won: u8) -> u32 {
    let bonus = if bid == won { BID_BONUS } else { 0 };
    bonus + won as u32 * POINTS_PER_TRICK
}

/// Cards from `hand` that may be played when `led` was led.
/// A player holding the led suit must follow it.
pub fn legal_plays(hand: &[Card], led: Option<Suit>) -> Vec<Card> {
    match led {
        Some(suit) if hand.iter().any(|c| c.suit == suit) => {
            hand.iter().copied().filter(|c| c.suit == suit).collect()
        }
        _ => hand.to_vec(),
    }
}
