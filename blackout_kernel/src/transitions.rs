/// Blackout Kernel: Centralized Transition Logic
///
/// ALL state-mutation logic lives here.
/// Handlers validate first, then mutate a clone; a rejected event never
/// leaves a partially updated state behind.

use crate::cards::{Card, DECK_SIZE};
use crate::domain::{
    CompletedTrick, GameConfig, GameState, Phase, PlayedCard, RoundRecord, TransitionResult,
};
use crate::error::{KernelError, Result};
use crate::events::{EventEnvelope, GameEvent};
use crate::rules;
use crate::seats::{circular_order, next_seat, Seat};
use crate::state::create_table;
use crate::tricks::trick_winner;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply *event* to *state* and return `(new_state, result)`.
/// The original state is never mutated.
pub fn apply_event(
    state: &GameState,
    event: &EventEnvelope,
) -> Result<(GameState, TransitionResult)> {
    let mut new_state = state.clone();

    let result = match &event.event {
        GameEvent::InitializeGame {
            num_players,
            max_tricks,
            first_dealer,
        } => apply_initialize_game(&mut new_state, *num_players, *max_tricks, *first_dealer)?,
        GameEvent::DealRound { deck_order } => apply_deal_round(&mut new_state, deck_order)?,
        GameEvent::PlaceBid { seat, bid } => apply_place_bid(&mut new_state, *seat, *bid)?,
        GameEvent::PlayCard { seat, card } => apply_play_card(&mut new_state, *seat, *card)?,
    };

    Ok((new_state, result))
}

// ---------------------------------------------------------------------------
// Individual transition handlers (private)
// ---------------------------------------------------------------------------

fn apply_initialize_game(
    state: &mut GameState,
    num_players: usize,
    requested: u8,
    first_dealer: Seat,
) -> Result<TransitionResult> {
    expect_phase(state, Phase::Setup)?;

    let max_tricks = rules::effective_max_tricks(num_players, requested)?;
    if first_dealer >= num_players {
        return Err(KernelError::UnknownSeat(first_dealer));
    }

    let config = GameConfig {
        num_players,
        requested_max_tricks: requested,
        max_tricks,
    };
    *state = create_table(config, first_dealer);

    Ok(TransitionResult {
        event_type: "initialize_game".to_string(),
        ..Default::default()
    })
}

fn apply_deal_round(state: &mut GameState, deck_order: &[u8]) -> Result<TransitionResult> {
    expect_phase(state, Phase::AwaitingDeal)?;
    let deck = validate_deck_order(deck_order)?;

    let n = state.num_players();
    for player in &mut state.players {
        player.hand.clear();
        player.bid = None;
        player.tricks_won = 0;
    }
    state.current_trick.clear();
    state.completed_tricks.clear();

    // One card at a time, starting left of the dealer.
    let mut next = deck.iter();
    for _ in 0..state.tricks_in_round {
        for seat in circular_order(n, state.dealer + 1) {
            // tricks_in_round * n <= 52 is guaranteed by effective_max_tricks.
            if let Some(card) = next.next() {
                state.players[seat].hand.push(*card);
            }
        }
    }
    state.trump_card = next.next().copied();

    for player in &mut state.players {
        player.hand.sort();
    }

    state.phase = Phase::Bidding;
    state.to_act = Some(next_seat(state.dealer, n));
    state.trick_leader = None;

    Ok(TransitionResult {
        event_type: "deal_round".to_string(),
        ..Default::default()
    })
}

fn apply_place_bid(state: &mut GameState, seat: Seat, bid: u8) -> Result<TransitionResult> {
    expect_phase(state, Phase::Bidding)?;
    expect_turn(state, seat)?;

    let tricks = state.tricks_in_round;
    let is_dealer = seat == state.dealer;
    let others_total = state.bids_total();

    if bid > tricks {
        return Err(KernelError::IllegalBid {
            seat,
            bid,
            reason: format!("bid exceeds the {} trick(s) in this round", tricks),
        });
    }
    if !rules::is_legal_bid(bid, tricks, is_dealer, others_total) {
        return Err(KernelError::IllegalBid {
            seat,
            bid,
            reason: format!(
                "dealer may not bring the bid total to {} (tricks in round)",
                tricks
            ),
        });
    }

    state.players[seat].bid = Some(bid);

    let n = state.num_players();
    if is_dealer {
        let leader = next_seat(state.dealer, n);
        state.phase = Phase::Playing;
        state.trick_leader = Some(leader);
        state.to_act = Some(leader);
    } else {
        state.to_act = Some(next_seat(seat, n));
    }

    Ok(TransitionResult {
        event_type: "place_bid".to_string(),
        ..Default::default()
    })
}

fn apply_play_card(state: &mut GameState, seat: Seat, card: Card) -> Result<TransitionResult> {
    expect_phase(state, Phase::Playing)?;
    expect_turn(state, seat)?;

    let hand = &state.players[seat].hand;
    let pos = hand
        .iter()
        .position(|c| *c == card)
        .ok_or(KernelError::CardNotInHand { seat, card })?;

    if let Some(led) = state.led_suit() {
        if card.suit != led && hand.iter().any(|c| c.suit == led) {
            return Err(KernelError::MustFollowSuit { seat, suit: led });
        }
    }

    state.players[seat].hand.remove(pos);
    state.current_trick.push(PlayedCard { seat, card });

    let n = state.num_players();
    let mut result = TransitionResult {
        event_type: "play_card".to_string(),
        ..Default::default()
    };

    if state.current_trick.len() < n {
        state.to_act = Some(next_seat(seat, n));
        return Ok(result);
    }

    // Trick complete.
    let plays = std::mem::take(&mut state.current_trick);
    let winner = trick_winner(&plays, state.trump_suit())
        .ok_or_else(|| KernelError::Invariant("completed trick has no plays".to_string()))?;
    let leader = state.trick_leader.unwrap_or(plays[0].seat);
    state.players[winner].tricks_won += 1;
    state.completed_tricks.push(CompletedTrick {
        leader,
        plays,
        winner,
    });
    result.trick_winner = Some(winner);

    if state.completed_tricks.len() < state.tricks_in_round as usize {
        state.trick_leader = Some(winner);
        state.to_act = Some(winner);
        return Ok(result);
    }

    result.round_records = close_round(state);
    result.round_completed = true;
    result.game_over = state.phase == Phase::GameOver;
    Ok(result)
}

// ---------------------------------------------------------------------------
// Round bookkeeping
// ---------------------------------------------------------------------------

/// Score the finished round, clear per-round state, then either advance
/// dealer and trick count or end the game.
fn close_round(state: &mut GameState) -> Vec<RoundRecord> {
    let round = state.round;
    let tricks = state.tricks_in_round;

    let mut records = Vec::with_capacity(state.num_players());
    for player in &mut state.players {
        let bid = player.bid.unwrap_or(0);
        let won = player.tricks_won;
        let points = rules::round_score(bid, won);
        player.score += points;
        let record = RoundRecord {
            round,
            seat: player.seat,
            tricks,
            bid,
            won,
            points,
        };
        player.history.push(record.clone());
        records.push(record);

        player.hand.clear();
        player.bid = None;
        player.tricks_won = 0;
    }

    state.trump_card = None;
    state.current_trick.clear();
    state.completed_tricks.clear();
    state.trick_leader = None;
    state.to_act = None;

    let max = state.config.max_tricks;
    if round >= rules::total_rounds(max) {
        state.phase = Phase::GameOver;
        return records;
    }

    state.round = round + 1;
    state.dealer = next_seat(state.dealer, state.num_players());
    state.tricks_in_round = rules::tricks_in_round(state.round, max);
    state.phase = Phase::AwaitingDeal;
    records
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn expect_phase(state: &GameState, expected: Phase) -> Result<()> {
    if state.phase != expected {
        return Err(KernelError::WrongPhase {
            expected,
            actual: state.phase,
        });
    }
    Ok(())
}

fn expect_turn(state: &GameState, seat: Seat) -> Result<()> {
    if seat >= state.num_players() {
        return Err(KernelError::UnknownSeat(seat));
    }
    match state.to_act {
        Some(expected) if expected != seat => Err(KernelError::OutOfTurn {
            expected,
            got: seat,
        }),
        Some(_) => Ok(()),
        None => Err(KernelError::Invariant(
            "no seat is to act in an active phase".to_string(),
        )),
    }
}

/// The deck order must name every card exactly once.
fn validate_deck_order(deck_order: &[u8]) -> Result<Vec<Card>> {
    if deck_order.len() != DECK_SIZE {
        return Err(KernelError::InvalidDeckOrder(format!(
            "expected {} cards, got {}",
            DECK_SIZE,
            deck_order.len()
        )));
    }
    let mut seen = [false; DECK_SIZE];
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for &idx in deck_order {
        let card = Card::from_index(idx).ok_or_else(|| {
            KernelError::InvalidDeckOrder(format!("card index {} out of range", idx))
        })?;
        if seen[idx as usize] {
            return Err(KernelError::InvalidDeckOrder(format!(
                "card {} appears twice",
                card
            )));
        }
        seen[idx as usize] = true;
        deck.push(card);
    }
    Ok(deck)
}
