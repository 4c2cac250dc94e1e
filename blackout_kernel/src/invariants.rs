/// Blackout Kernel: Invariant Checks
///
/// Run after every transition and on every restored snapshot.
/// Returns the first failure as `KernelError::Invariant`.

use std::collections::BTreeSet;

use crate::cards::Card;
use crate::domain::{GameState, Phase};
use crate::error::{KernelError, Result};
use crate::rules;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all invariant checks. Stops at the first failure.
pub fn validate_invariants(state: &GameState) -> Result<()> {
    check_config(state)?;
    check_seats_in_range(state)?;
    check_schedule(state)?;
    check_unique_cards(state)?;
    check_hand_sizes(state)?;
    check_tricks_won(state)?;
    check_bid_total(state)?;
    Ok(())
}

fn violation(tag: &str, msg: String) -> KernelError {
    KernelError::Invariant(format!("[INVARIANT:{}] {}", tag, msg))
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

/// The trick ceiling is the one `initialize_game` would have chosen.
/// Runs first: the schedule check does arithmetic on it.
fn check_config(state: &GameState) -> Result<()> {
    if state.phase == Phase::Setup {
        return Ok(());
    }
    let config = &state.config;
    let expected = rules::effective_max_tricks(config.num_players, config.requested_max_tricks)
        .map_err(|e| violation("config", e.to_string()))?;
    if config.max_tricks != expected {
        return Err(violation(
            "config",
            format!(
                "max_tricks={} but {} players asking for {} get {}",
                config.max_tricks, config.num_players, config.requested_max_tricks, expected
            ),
        ));
    }
    Ok(())
}

/// Dealer, seat to act and trick leader all sit at the table.
fn check_seats_in_range(state: &GameState) -> Result<()> {
    if state.phase == Phase::Setup {
        return Ok(());
    }
    let n = state.num_players();
    if n != state.config.num_players {
        return Err(violation(
            "seats",
            format!("{} players at a table configured for {}", n, state.config.num_players),
        ));
    }
    for (i, p) in state.players.iter().enumerate() {
        if p.seat != i {
            return Err(violation("seats", format!("player at index {} claims seat {}", i, p.seat)));
        }
    }
    let named = [
        ("dealer", Some(state.dealer)),
        ("to_act", state.to_act),
        ("trick_leader", state.trick_leader),
    ];
    for (what, seat) in named {
        if let Some(seat) = seat {
            if seat >= n {
                return Err(violation("seats", format!("{}={} out of range", what, seat)));
            }
        }
    }
    Ok(())
}

/// Round number and trick count follow the rise-and-fall schedule.
fn check_schedule(state: &GameState) -> Result<()> {
    if state.phase == Phase::Setup {
        return Ok(());
    }
    let max = state.config.max_tricks;
    let total = rules::total_rounds(max);
    if state.round == 0 || state.round > total {
        return Err(violation(
            "schedule",
            format!("round {} outside 1..={}", state.round, total),
        ));
    }
    let expected = rules::tricks_in_round(state.round, max);
    if state.tricks_in_round != expected {
        return Err(violation(
            "schedule",
            format!(
                "round {} has {} tricks, schedule says {}",
                state.round, state.tricks_in_round, expected
            ),
        ));
    }
    Ok(())
}

/// No card is in two places at once.
fn check_unique_cards(state: &GameState) -> Result<()> {
    let mut seen: BTreeSet<Card> = BTreeSet::new();
    let hands = state.players.iter().flat_map(|p| p.hand.iter().copied());
    let current = state.current_trick.iter().map(|p| p.card);
    let completed = state
        .completed_tricks
        .iter()
        .flat_map(|t| t.plays.iter().map(|p| p.card));
    for card in hands.chain(current).chain(completed).chain(state.trump_card) {
        if !seen.insert(card) {
            return Err(violation("unique_cards", format!("card {} appears twice", card)));
        }
    }
    Ok(())
}

/// Every hand holds exactly the cards its owner has not played yet.
fn check_hand_sizes(state: &GameState) -> Result<()> {
    if !matches!(state.phase, Phase::Bidding | Phase::Playing) {
        if let Some(p) = state.players.iter().find(|p| !p.hand.is_empty()) {
            return Err(violation(
                "hand_sizes",
                format!("seat {} holds cards outside a round", p.seat),
            ));
        }
        return Ok(());
    }
    let done = state.completed_tricks.len();
    for p in &state.players {
        let in_trick = state.current_trick.iter().any(|pc| pc.seat == p.seat) as usize;
        let expected = (state.tricks_in_round as usize)
            .checked_sub(done + in_trick)
            .ok_or_else(|| violation("hand_sizes", "more tricks played than dealt".to_string()))?;
        if p.hand.len() != expected {
            return Err(violation(
                "hand_sizes",
                format!("seat {} holds {} cards, expected {}", p.seat, p.hand.len(), expected),
            ));
        }
    }
    Ok(())
}

/// Tricks credited to players equal tricks completed.
fn check_tricks_won(state: &GameState) -> Result<()> {
    let credited: usize = state.players.iter().map(|p| p.tricks_won as usize).sum();
    if credited != state.completed_tricks.len() {
        return Err(violation(
            "tricks_won",
            format!(
                "players credited with {} tricks, {} completed",
                credited,
                state.completed_tricks.len()
            ),
        ));
    }
    Ok(())
}

/// Once everyone has bid, the bids never total the trick count.
fn check_bid_total(state: &GameState) -> Result<()> {
    if state.players.is_empty() || state.players.iter().any(|p| p.bid.is_none()) {
        return Ok(());
    }
    let total = state.bids_total();
    if total == state.tricks_in_round as u32 {
        return Err(violation(
            "bid_total",
            format!("bids total {} equals tricks in round", total),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameConfig;
    use crate::state::{create_initial_state, create_table};

    fn table() -> GameState {
        create_table(
            GameConfig {
                num_players: 3,
                requested_max_tricks: 3,
                max_tricks: 3,
            },
            0,
        )
    }

    #[test]
    fn test_fresh_states_are_valid() {
        validate_invariants(&create_initial_state()).unwrap();
        validate_invariants(&table()).unwrap();
    }

    #[test]
    fn test_duplicate_card_detected() {
        let mut state = table();
        state.phase = Phase::Bidding;
        let ace: Card = "AS".parse().unwrap();
        state.players[0].hand.push(ace);
        state.players[1].hand.push("2H".parse().unwrap());
        state.players[2].hand.push("3H".parse().unwrap());
        state.trump_card = Some(ace);
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("unique_cards"), "{}", err);
    }

    #[test]
    fn test_bad_dealer_detected() {
        let mut state = table();
        state.dealer = 7;
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("seats"), "{}", err);
    }

    #[test]
    fn test_bid_total_detected() {
        let mut state = table();
        state.phase = Phase::Playing;
        for (i, c) in ["2S", "3S", "4S"].iter().enumerate() {
            state.players[i].hand.push(c.parse().unwrap());
        }
        state.players[0].bid = Some(1);
        state.players[1].bid = Some(0);
        state.players[2].bid = Some(0);
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("bid_total"), "{}", err);
    }

    #[test]
    fn test_hand_size_mismatch_detected() {
        let mut state = table();
        state.phase = Phase::Bidding;
        state.to_act = Some(1);
        state.players[0].hand.push("2S".parse().unwrap());
        state.players[2].hand.push("3S".parse().unwrap());
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("hand_sizes"), "{}", err);
    }

    #[test]
    fn test_cards_held_between_rounds_detected() {
        let mut state = table();
        state.players[1].hand.push("KD".parse().unwrap());
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("hand_sizes"), "{}", err);
    }

    #[test]
    fn test_tricks_won_without_completed_trick_detected() {
        let mut state = table();
        state.players[0].tricks_won = 1;
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("tricks_won"), "{}", err);
    }

    #[test]
    fn test_impossible_trick_ceiling_detected() {
        for bad in [0u8, 2, 200] {
            let mut state = table();
            state.config.max_tricks = bad;
            let err = validate_invariants(&state).unwrap_err();
            assert!(err.to_string().contains("config"), "{}: {}", bad, err);
        }
        let mut state = table();
        state.config.requested_max_tricks = 0;
        state.config.max_tricks = 0;
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("config"), "{}", err);
    }

    #[test]
    fn test_schedule_mismatch_detected() {
        let mut state = table();
        state.tricks_in_round = 2;
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.to_string().contains("schedule"), "{}", err);
    }
}
