/// Blackout Kernel: Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing.
/// Produces byte-identical output across platforms.
///
/// Rules:
///   - kernel_version is always the first field
///   - players in seat order, hands sorted
///   - cards in text notation ("QS", "10H")
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{CompletedTrick, GameState, PlayedCard, Player};
use crate::KERNEL_VERSION;

/// Canonical serialization of GameState to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &GameState) -> Vec<u8> {
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &GameState) -> String {
    let digest = Sha256::digest(canonical_serialize(state));
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Build the canonical serde_json::Value in strict field order.
///
/// serde_json::Map preserves insertion order (preserve_order feature).
fn build_canonical_value(state: &GameState) -> Value {
    let players: Vec<Value> = state.players.iter().map(player_value).collect();
    let current: Vec<Value> = state.current_trick.iter().map(play_value).collect();
    let completed: Vec<Value> = state.completed_tricks.iter().map(trick_value).collect();

    let mut config = Map::new();
    config.insert("num_players".to_string(), json!(state.config.num_players));
    config.insert(
        "requested_max_tricks".to_string(),
        json!(state.config.requested_max_tricks),
    );
    config.insert("max_tricks".to_string(), json!(state.config.max_tricks));

    // kernel_version MUST be first: it is part of the kernel identity.
    let mut root = Map::new();
    root.insert("kernel_version".to_string(), json!(KERNEL_VERSION));
    root.insert("config".to_string(), Value::Object(config));
    root.insert("phase".to_string(), json!(state.phase.as_str()));
    root.insert("round".to_string(), json!(state.round));
    root.insert("dealer".to_string(), json!(state.dealer));
    root.insert("tricks_in_round".to_string(), json!(state.tricks_in_round));
    root.insert(
        "trump_card".to_string(),
        json!(state.trump_card.map(|c| c.to_string())),
    );
    root.insert("to_act".to_string(), json!(state.to_act));
    root.insert("trick_leader".to_string(), json!(state.trick_leader));
    root.insert("current_trick".to_string(), Value::Array(current));
    root.insert("completed_tricks".to_string(), Value::Array(completed));
    root.insert("players".to_string(), Value::Array(players));

    Value::Object(root)
}

fn player_value(p: &Player) -> Value {
    let mut hand: Vec<_> = p.hand.clone();
    hand.sort();

    let history: Vec<Value> = p
        .history
        .iter()
        .map(|r| {
            let mut m = Map::new();
            m.insert("round".to_string(), json!(r.round));
            m.insert("tricks".to_string(), json!(r.tricks));
            m.insert("bid".to_string(), json!(r.bid));
            m.insert("won".to_string(), json!(r.won));
            m.insert("points".to_string(), json!(r.points));
            Value::Object(m)
        })
        .collect();

    let mut m = Map::new();
    m.insert("seat".to_string(), json!(p.seat));
    m.insert(
        "hand".to_string(),
        Value::Array(hand.iter().map(|c| Value::String(c.to_string())).collect()),
    );
    m.insert("bid".to_string(), json!(p.bid));
    m.insert("tricks_won".to_string(), json!(p.tricks_won));
    m.insert("score".to_string(), json!(p.score));
    m.insert("history".to_string(), Value::Array(history));
    Value::Object(m)
}

fn play_value(p: &PlayedCard) -> Value {
    let mut m = Map::new();
    m.insert("seat".to_string(), json!(p.seat));
    m.insert("card".to_string(), Value::String(p.card.to_string()));
    Value::Object(m)
}

fn trick_value(t: &CompletedTrick) -> Value {
    let mut m = Map::new();
    m.insert("leader".to_string(), json!(t.leader));
    m.insert(
        "plays".to_string(),
        Value::Array(t.plays.iter().map(play_value).collect()),
    );
    m.insert("winner".to_string(), json!(t.winner));
    Value::Object(m)
}
