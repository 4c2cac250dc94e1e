//! Replay orchestrator: rebuild state from event log.
//!
//! Delegates all game logic to the kernel.
//! No shortcuts, no cached state logic.

use tracing::debug;

use blackout_kernel::domain::GameState;
use blackout_kernel::engine::BlackoutEngine;
use blackout_kernel::events::EventEnvelope;
use blackout_kernel::hashing::canonical_hash;
use blackout_kernel::KernelError;

/// Rebuild the game state from a sequence of events.
///
/// 1. Create fresh engine + state
/// 2. Pass each event sequentially to the kernel
/// 3. Return (final_state, canonical_hash)
///
/// Stops at the first event the kernel rejects.
pub fn rebuild_state(events: &[EventEnvelope]) -> Result<(GameState, String), KernelError> {
    let mut engine = BlackoutEngine::new();
    let state = engine.replay(events)?.clone();
    let hash = canonical_hash(&state);
    debug!(events = events.len(), hash = %hash, "state rebuilt");
    Ok((state, hash))
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(events: &[EventEnvelope]) -> Result<String, KernelError> {
    rebuild_state(events).map(|(_, hash)| hash)
}
