/// Blackout Kernel: State Construction

use crate::domain::{GameConfig, GameState, Phase, Player};
use crate::rules::tricks_in_round;
use crate::seats::Seat;

/// Fresh state before any event: no players, phase `setup`.
pub fn create_initial_state() -> GameState {
    GameState::default()
}

/// State right after `initialize_game`: empty hands, round 1, waiting
/// for the first deal. `config.max_tricks` must already be validated.
pub fn create_table(config: GameConfig, first_dealer: Seat) -> GameState {
    let players = (0..config.num_players).map(Player::new).collect();
    let tricks = tricks_in_round(1, config.max_tricks);
    GameState {
        config,
        phase: Phase::AwaitingDeal,
        round: 1,
        dealer: first_dealer,
        tricks_in_round: tricks,
        players,
        ..GameState::default()
    }
}
