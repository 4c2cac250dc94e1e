//! Error types for kernel transitions.

use thiserror::Error;

use crate::cards::{Card, Suit};
use crate::domain::Phase;
use crate::seats::Seat;

/// Every reason the kernel can reject an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("Schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },

    #[error("Sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },

    /// `initialize_game` must be the first event, and only the first.
    #[error("Event ordering: {0}")]
    Ordering(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid rank {0}: must be between 2 and 14")]
    InvalidRank(u8),

    #[error("Invalid card {0:?}: expected notation like QS or 10H")]
    InvalidCard(String),

    #[error("Invalid deck order: {0}")]
    InvalidDeckOrder(String),

    #[error("Wrong phase: expected {expected:?}, got {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("Out of turn: seat {expected} is to act, got seat {got}")]
    OutOfTurn { expected: Seat, got: Seat },

    #[error("Unknown seat {0}")]
    UnknownSeat(Seat),

    #[error("Illegal bid {bid} from seat {seat}: {reason}")]
    IllegalBid { seat: Seat, bid: u8, reason: String },

    #[error("Seat {seat} does not hold {card}")]
    CardNotInHand { seat: Seat, card: Card },

    #[error("Seat {seat} must follow suit {suit}")]
    MustFollowSuit { seat: Seat, suit: Suit },

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Result type alias for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
