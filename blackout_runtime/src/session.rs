//! Session manager: isolated sessions with persist-after-apply semantics.
//!
//! Each session gets its own directory with an event log and snapshots.
//! Concurrency: Mutex for write serialization, no global mutable state.
//!
//! Apply-before-persist order:
//!   1. engine.apply_event(event): rejected events never reach disk
//!   2. event_store.append_event(): engine rolled back if this fails
//!   3. snapshot if interval reached (failure logged, event stays committed)
//!
//! Randomness (shuffles, first dealer, automatic moves) comes from the
//! session's own `StdRng` and enters the kernel only through events.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use blackout_kernel::cards::{Card, DECK_SIZE};
use blackout_kernel::domain::{GameState, Phase, TransitionResult};
use blackout_kernel::engine::BlackoutEngine;
use blackout_kernel::events::{EventEnvelope, GameEvent};
use blackout_kernel::hashing::canonical_hash;
use blackout_kernel::seats::Seat;
use blackout_kernel::view;

use crate::error::{Result, RuntimeError};
use crate::event_store::EventStore;
use crate::proto_bridge::{kernel_to_proto, proto_to_kernel};
use crate::replay;
use crate::snapshot::{self, Snapshot};

/// An isolated game session with its own event log and state.
pub struct Session {
    session_id: String,
    session_dir: PathBuf,
    engine: BlackoutEngine,
    event_store: EventStore,
    snapshot_interval: u64,
    current_sequence: u64,
    rng: StdRng,
}

impl Session {
    /// Open (or create) a session in the given base directory.
    ///
    /// Directory structure:
    ///   <base_dir>/<session_id>/events.log
    ///   <base_dir>/<session_id>/snapshots/
    ///
    /// An existing log is replayed through the kernel; a log the kernel
    /// rejects fails the open.
    pub fn new(
        base_dir: &Path,
        session_id: &str,
        snapshot_interval: u64,
        seed: Option<u64>,
    ) -> Result<Self> {
        let session_dir = base_dir.join(session_id);
        let event_store = EventStore::open(&session_dir.join("events.log"))?;
        let last_seq = event_store.last_sequence();

        let mut engine = BlackoutEngine::new();
        if last_seq > 0 {
            for pe in &event_store.load_all_events()? {
                engine.apply_event(&proto_to_kernel(pe)?)?;
            }
            info!(session = session_id, events = last_seq, "session resumed from log");
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            session_id: session_id.to_string(),
            session_dir,
            engine,
            event_store,
            snapshot_interval,
            current_sequence: last_seq,
            rng,
        })
    }

    /// Apply a single event: validate via kernel, then persist.
    ///
    /// Returns (state_clone, transition_result).
    pub fn apply_event(&mut self, event: &EventEnvelope) -> Result<(GameState, TransitionResult)> {
        let before = self.engine.clone();

        let (state, result) = self.engine.apply_event(event)?;
        let state = state.clone();

        if let Err(err) = self.event_store.append_event(&kernel_to_proto(event)) {
            self.engine = before;
            return Err(err.into());
        }
        self.current_sequence = event.sequence;

        // The event is already committed; a failed snapshot is logged, not returned.
        if self.snapshot_interval > 0 && event.sequence % self.snapshot_interval == 0 {
            if let Err(err) = snapshot::save_snapshot(&self.snapshot_dir(), event.sequence, &state) {
                warn!(sequence = event.sequence, error = %err, "snapshot failed");
            }
        }

        Ok((state, result))
    }

    /// Wrap `event` in the next envelope and apply it.
    pub fn submit(&mut self, event: GameEvent) -> Result<TransitionResult> {
        let envelope = EventEnvelope::new(self.current_sequence + 1, event);
        self.apply_event(&envelope).map(|(_, result)| result)
    }

    /// Start the game. A missing `first_dealer` is drawn at random.
    pub fn start_game(
        &mut self,
        num_players: usize,
        max_tricks: u8,
        first_dealer: Option<Seat>,
    ) -> Result<TransitionResult> {
        let first_dealer =
            first_dealer.unwrap_or_else(|| self.rng.random_range(0..num_players.max(1)));
        info!(
            session = %self.session_id,
            num_players,
            max_tricks,
            first_dealer,
            "starting game"
        );
        self.submit(GameEvent::InitializeGame {
            num_players,
            max_tricks,
            first_dealer,
        })
    }

    /// Shuffle a fresh deck and deal the next round.
    pub fn deal(&mut self) -> Result<TransitionResult> {
        let mut deck_order: Vec<u8> = (0..DECK_SIZE as u8).collect();
        deck_order.shuffle(&mut self.rng);
        self.submit(GameEvent::DealRound { deck_order })
    }

    /// Place a bid for the seat to act.
    pub fn bid(&mut self, bid: u8) -> Result<TransitionResult> {
        let seat = self.seat_to_act()?;
        self.submit(GameEvent::PlaceBid { seat, bid })
    }

    /// Play a card for the seat to act.
    pub fn play(&mut self, card: Card) -> Result<TransitionResult> {
        let seat = self.seat_to_act()?;
        self.submit(GameEvent::PlayCard { seat, card })
    }

    fn seat_to_act(&self) -> Result<Seat> {
        self.engine.state().to_act.ok_or_else(|| {
            RuntimeError::Command(format!(
                "no seat to act in phase {}",
                self.engine.state().phase.as_str()
            ))
        })
    }

    /// Take one random legal action: deal, bid or play.
    ///
    /// Returns `None` when nothing can be done (no game yet, or game over).
    pub fn auto_step(&mut self) -> Result<Option<TransitionResult>> {
        let state = self.engine.state();
        let result = match state.phase {
            Phase::Setup | Phase::GameOver => return Ok(None),
            Phase::AwaitingDeal => self.deal()?,
            Phase::Bidding => {
                let bids = view::legal_bids(state);
                if bids.is_empty() {
                    return Ok(None);
                }
                let bid = bids[self.rng.random_range(0..bids.len())];
                self.bid(bid)?
            }
            Phase::Playing => {
                let cards = view::legal_cards(state);
                if cards.is_empty() {
                    return Ok(None);
                }
                let card = cards[self.rng.random_range(0..cards.len())];
                self.play(card)?
            }
        };
        debug!(event_type = %result.event_type, "auto step");
        Ok(Some(result))
    }

    /// Run `auto_step` until the game ends or `max_steps` actions were taken.
    /// Returns the number of actions taken.
    pub fn auto_play(&mut self, max_steps: usize) -> Result<usize> {
        let mut steps = 0;
        while steps < max_steps && self.auto_step()?.is_some() {
            steps += 1;
        }
        Ok(steps)
    }

    /// All events in the log, decoded.
    pub fn events(&self) -> Result<Vec<EventEnvelope>> {
        self.event_store
            .load_all_events()?
            .iter()
            .map(proto_to_kernel)
            .collect()
    }

    /// Full replay from event log: reset engine and replay all events.
    pub fn replay_full(&mut self) -> Result<(GameState, String)> {
        let events = self.events()?;
        let (state, hash) = replay::rebuild_state(&events)?;

        let mut engine = BlackoutEngine::new();
        engine.replay(&events)?;
        self.engine = engine;

        info!(session = %self.session_id, events = events.len(), hash = %hash, "full replay");
        Ok((state, hash))
    }

    /// Most recent snapshot written for this session, if any.
    pub fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(snapshot::load_latest_snapshot(&self.snapshot_dir())?)
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    /// Get current canonical hash.
    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    fn snapshot_dir(&self) -> PathBuf {
        self.session_dir.join("snapshots")
    }
}

/// Thread-safe session handle using Mutex.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Lock the session for a sequence of operations.
    pub fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.inner.lock().map_err(|_| RuntimeError::LockPoisoned)
    }

    /// Apply event under lock.
    pub fn apply_event(&self, event: &EventEnvelope) -> Result<(GameState, TransitionResult)> {
        self.lock()?.apply_event(event)
    }

    /// Take one random legal action under lock.
    pub fn auto_step(&self) -> Result<Option<TransitionResult>> {
        self.lock()?.auto_step()
    }

    pub fn current_hash(&self) -> Result<String> {
        Ok(self.lock()?.current_hash())
    }

    pub fn current_sequence(&self) -> Result<u64> {
        Ok(self.lock()?.current_sequence())
    }
}
