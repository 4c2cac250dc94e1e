//! Error types for the runtime layer.

use std::io;

use thiserror::Error;

use blackout_kernel::KernelError;

use crate::snapshot_codec::SnapshotError;

/// Everything that can go wrong between the kernel and the disk or terminal.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The kernel rejected an event.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// A stored frame decoded, but does not describe a valid event.
    #[error("Corrupt event at sequence {sequence}: {reason}")]
    CorruptEvent { sequence: u64, reason: String },

    #[error("Determinism failure: run 1 hash {first}, run 2 hash {second}")]
    Determinism { first: String, second: String },

    /// Console input that does not parse as a command.
    #[error("{0}")]
    Command(String),

    #[error("Session lock poisoned")]
    LockPoisoned,
}

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
