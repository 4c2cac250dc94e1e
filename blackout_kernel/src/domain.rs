/// Blackout Kernel: Core Domain Types
///
/// Pure data. No transition logic.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};
use crate::seats::Seat;

// ── Core Domain Types ──────────────────────────────────────────────

/// Where the game stands between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No `initialize_game` yet.
    Setup,
    AwaitingDeal,
    Bidding,
    Playing,
    GameOver,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::AwaitingDeal => "awaiting_deal",
            Phase::Bidding => "bidding",
            Phase::Playing => "playing",
            Phase::GameOver => "game_over",
        }
    }
}

/// Table configuration fixed by `initialize_game`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    pub num_players: usize,
    /// Ceiling asked for by the caller.
    pub requested_max_tricks: u8,
    /// Ceiling actually used after the deck-size check.
    pub max_tricks: u8,
}

/// Outcome of one round for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundRecord {
    pub round: u8,
    pub seat: Seat,
    pub tricks: u8,
    pub bid: u8,
    pub won: u8,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Player {
    pub seat: Seat,
    pub hand: Vec<Card>, // sorted
    pub bid: Option<u8>,
    pub tricks_won: u8,
    pub score: u32,
    pub history: Vec<RoundRecord>,
}

impl Player {
    pub fn new(seat: Seat) -> Self {
        Self {
            seat,
            hand: Vec::new(),
            bid: None,
            tricks_won: 0,
            score: 0,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayedCard {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletedTrick {
    pub leader: Seat,
    pub plays: Vec<PlayedCard>,
    pub winner: Seat,
}

/// Structured, immutable outcome of a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionResult {
    pub event_type: String,
    pub trick_winner: Option<Seat>,
    pub round_completed: bool,
    pub round_records: Vec<RoundRecord>,
    pub game_over: bool,
}

impl Default for TransitionResult {
    fn default() -> Self {
        Self {
            event_type: String::new(),
            trick_winner: None,
            round_completed: false,
            round_records: Vec::new(),
            game_over: false,
        }
    }
}

/// Complete game state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: Phase,
    /// 1-based once the game is initialized.
    pub round: u8,
    pub dealer: Seat,
    pub tricks_in_round: u8,
    pub trump_card: Option<Card>,
    pub to_act: Option<Seat>,
    pub trick_leader: Option<Seat>,
    pub current_trick: Vec<PlayedCard>,
    pub completed_tricks: Vec<CompletedTrick>,
    pub players: Vec<Player>,
}

impl GameState {
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat)
    }

    /// Sum of bids placed so far this round.
    pub fn bids_total(&self) -> u32 {
        self.players.iter().filter_map(|p| p.bid).map(u32::from).sum()
    }

    /// Suit of the first card in the trick being played, if any.
    pub fn led_suit(&self) -> Option<Suit> {
        self.current_trick.first().map(|p| p.card.suit)
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.trump_card.map(|c| c.suit)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            phase: Phase::Setup,
            round: 0,
            dealer: 0,
            tricks_in_round: 0,
            trump_card: None,
            to_act: None,
            trick_leader: None,
            current_trick: Vec::new(),
            completed_tricks: Vec::new(),
            players: Vec::new(),
        }
    }
}
