#![forbid(unsafe_code)]

//! Blackout Kernel
//!
//! A framework-independent implementation of the card game Blackout
//! ("Oh, Hell"). Pure and deterministic: every random choice arrives as
//! an event, so replaying an event log always rebuilds the same game.

/// Kernel v1: behavioral changes require a new kernel version.
pub const KERNEL_VERSION: u32 = 1;

pub mod cards;
pub mod seats;
pub mod rules;
pub mod error;
pub mod domain;
pub mod events;
pub mod state;
pub mod tricks;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;
pub mod view;

pub use cards::{Card, Rank, Suit};
pub use domain::{GameState, Phase, TransitionResult};
pub use engine::BlackoutEngine;
pub use error::{KernelError, Result};
pub use events::{EventEnvelope, GameEvent};
pub use seats::Seat;
