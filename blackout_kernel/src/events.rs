/// Blackout Kernel: Event Definitions
///
/// Events are pure data. They carry intent and payload only.
/// Every random choice (shuffles, first dealer) arrives inside an event,
/// which keeps replay deterministic.
///
/// Schema version is locked at 1. Events with schema_version != 1
/// are rejected by the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cards::Card;
use crate::error::{KernelError, Result};
use crate::seats::Seat;

/// Schema version for v1 kernel events.
pub const SCHEMA_VERSION: u32 = 1;

/// Player intent or table action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    InitializeGame {
        num_players: usize,
        max_tricks: u8,
        first_dealer: Seat,
    },
    DealRound {
        /// Permutation of deck indices 0..52, top of the deck first.
        deck_order: Vec<u8>,
    },
    PlaceBid {
        seat: Seat,
        bid: u8,
    },
    PlayCard {
        seat: Seat,
        card: Card,
    },
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::InitializeGame { .. } => "initialize_game",
            GameEvent::DealRound { .. } => "deal_round",
            GameEvent::PlaceBid { .. } => "place_bid",
            GameEvent::PlayCard { .. } => "play_card",
        }
    }
}

/// Sequenced wrapper around a `GameEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub logical_time: u64,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub event: GameEvent,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl EventEnvelope {
    /// Wrap `event` at `sequence`, with logical time following the sequence.
    pub fn new(sequence: u64, event: GameEvent) -> Self {
        Self {
            sequence,
            logical_time: sequence,
            schema_version: SCHEMA_VERSION,
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    pub fn to_value(&self) -> Value {
        // Every field is plain data; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse an EventEnvelope from a serde_json::Value (fixtures, logs).
    pub fn from_value(v: &Value) -> Result<Self> {
        serde_json::from_value(v.clone())
            .map_err(|e| KernelError::MalformedEvent(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_json_shape() {
        let env = EventEnvelope::new(
            3,
            GameEvent::PlayCard {
                seat: 1,
                card: "QS".parse().unwrap(),
            },
        );
        let v = env.to_value();
        assert_eq!(v["sequence"], json!(3));
        assert_eq!(v["event"]["event_type"], json!("play_card"));
        assert_eq!(v["event"]["payload"]["card"], json!("QS"));
        assert_eq!(EventEnvelope::from_value(&v).unwrap(), env);
    }

    #[test]
    fn test_missing_schema_version_defaults_to_one() {
        let v = json!({
            "sequence": 1,
            "logical_time": 1,
            "event": {
                "event_type": "initialize_game",
                "payload": { "num_players": 4, "max_tricks": 7, "first_dealer": 0 }
            }
        });
        let env = EventEnvelope::from_value(&v).unwrap();
        assert_eq!(env.schema_version, SCHEMA_VERSION);
        assert_eq!(env.event_type(), "initialize_game");
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let v = json!({
            "sequence": 1,
            "logical_time": 1,
            "event": { "event_type": "shuffle_twice", "payload": {} }
        });
        assert!(EventEnvelope::from_value(&v).is_err());
    }
}
