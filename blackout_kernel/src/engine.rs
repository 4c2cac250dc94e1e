/// Blackout Kernel: Engine
///
/// Top-level orchestrator. Delegates mutation to transitions,
/// validates via invariants.
///
/// Strict sequence enforcement, initialize-first validation.

use tracing::{debug, warn};

use crate::domain::{GameState, TransitionResult};
use crate::error::{KernelError, Result};
use crate::events::{EventEnvelope, GameEvent, SCHEMA_VERSION};
use crate::invariants::validate_invariants;
use crate::state::create_initial_state;
use crate::transitions::apply_event as transition_apply;

/// Stateful engine wrapping the pure functional transition layer.
#[derive(Debug, Clone)]
pub struct BlackoutEngine {
    state: GameState,
    last_sequence: u64,
    initialized: bool,
}

impl Default for BlackoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackoutEngine {
    /// Create an engine holding a fresh `setup` state.
    pub fn new() -> Self {
        Self {
            state: create_initial_state(),
            last_sequence: 0,
            initialized: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Discard everything and return to a fresh `setup` state.
    pub fn initialize_state(&mut self) -> &GameState {
        self.state = create_initial_state();
        self.last_sequence = 0;
        self.initialized = false;
        &self.state
    }

    /// Apply a single event:
    ///   1. Validate schema version (must be 1)
    ///   2. Validate sequence (strictly increasing, no gaps)
    ///   3. Validate initialize-first rule
    ///   4. Delegate to transitions::apply_event
    ///   5. Validate invariants on new state
    ///   6. Store and return
    ///
    /// On error the engine is left exactly as it was.
    pub fn apply_event(
        &mut self,
        event: &EventEnvelope,
    ) -> Result<(&GameState, TransitionResult)> {
        match self.try_apply(event) {
            Ok((state, result)) => {
                self.state = state;
                self.last_sequence = event.sequence;
                self.initialized = true;
                debug!(
                    sequence = event.sequence,
                    event_type = event.event_type(),
                    round = self.state.round,
                    phase = self.state.phase.as_str(),
                    "event applied"
                );
                Ok((&self.state, result))
            }
            Err(err) => {
                warn!(
                    sequence = event.sequence,
                    event_type = event.event_type(),
                    error = %err,
                    "event rejected"
                );
                Err(err)
            }
        }
    }

    fn try_apply(&self, event: &EventEnvelope) -> Result<(GameState, TransitionResult)> {
        // -- Schema version enforcement --
        if event.schema_version != SCHEMA_VERSION {
            return Err(KernelError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: event.schema_version,
            });
        }

        // -- Sequence enforcement --
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(KernelError::Sequence {
                expected,
                got: event.sequence,
            });
        }

        // -- Initialize-first enforcement --
        let is_init = matches!(event.event, GameEvent::InitializeGame { .. });
        if !self.initialized && !is_init {
            return Err(KernelError::Ordering(format!(
                "first event MUST be initialize_game, got {}",
                event.event_type()
            )));
        }
        if self.initialized && is_init {
            return Err(KernelError::Ordering(
                "initialize_game can only be the first event".to_string(),
            ));
        }

        let (new_state, result) = transition_apply(&self.state, event)?;
        validate_invariants(&new_state)?;
        Ok((new_state, result))
    }

    /// Apply an ordered sequence of events deterministically.
    /// Stops at the first rejected event.
    pub fn apply_sequence(&mut self, events: &[EventEnvelope]) -> Result<&GameState> {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset and replay.
    pub fn replay(&mut self, events: &[EventEnvelope]) -> Result<&GameState> {
        self.initialize_state();
        self.apply_sequence(events)
    }
}
