//! Snapshot Codec: deterministic GameState encoder/decoder.
//!
//! Pure codec layer. No side-effects, no timestamps, no envelope.
//!
//! - `encode_snapshot`:  GameState → JSON string
//! - `decode_snapshot`:  JSON string → GameState (strict, no defaults)
//! - `restore_snapshot`: decode + invariant validation
//! - `export_snapshot_to_file` / `import_snapshot_from_file`: file I/O
//! - `snapshot_hash`:    SHA-256 of the encoding (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use blackout_kernel::domain::GameState;
use blackout_kernel::invariants::validate_invariants;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible snapshot codec failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("SerializationError: {0}")]
    SerializationError(String),
    /// Malformed JSON, missing fields or unknown fields.
    #[error("DeserializationError: {0}")]
    DeserializationError(String),
    /// Loaded state violates kernel invariants.
    #[error("InvariantViolation: {0}")]
    InvariantViolation(String),
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a GameState to a compact JSON string.
///
/// Field order follows the struct declarations, so equal states give
/// byte-identical output.
pub fn encode_snapshot(state: &GameState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a JSON string into a GameState.
///
/// `deny_unknown_fields` on every kernel type rejects unexpected fields.
/// No invariant validation; use `restore_snapshot` for validated loading.
pub fn decode_snapshot(json: &str) -> Result<GameState, SnapshotError> {
    serde_json::from_str::<GameState>(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))
}

/// Decode a JSON string and validate invariants immediately.
///
/// Entry point for loading state from untrusted sources.
pub fn restore_snapshot(json: &str) -> Result<GameState, SnapshotError> {
    let state = decode_snapshot(json)?;
    validate_invariants(&state).map_err(|e| SnapshotError::InvariantViolation(e.to_string()))?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Export a GameState to a file. Creates parent directories if needed.
pub fn export_snapshot_to_file(state: &GameState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(state)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, json.as_bytes())?;
    Ok(())
}

/// Import a GameState from a JSON file, validating invariants.
pub fn import_snapshot_from_file(path: &Path) -> Result<GameState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of `encode_snapshot` output. Lowercase hex string.
///
/// NOTE: this is not `hashing::canonical_hash`, which has its own field
/// layout and carries `kernel_version`. This one checks file integrity.
pub fn snapshot_hash(state: &GameState) -> Result<String, SnapshotError> {
    let json = encode_snapshot(state)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use blackout_kernel::domain::Phase;
    use blackout_kernel::engine::BlackoutEngine;
    use blackout_kernel::events::{EventEnvelope, GameEvent};
    use std::path::PathBuf;

    /// Two players, first round dealt, bidding open.
    fn make_test_state() -> GameState {
        let mut engine = BlackoutEngine::new();
        let events = vec![
            EventEnvelope::new(
                1,
                GameEvent::InitializeGame {
                    num_players: 2,
                    max_tricks: 2,
                    first_dealer: 0,
                },
            ),
            EventEnvelope::new(
                2,
                GameEvent::DealRound {
                    deck_order: (0..52).collect(),
                },
            ),
        ];
        engine.apply_sequence(&events).unwrap().clone()
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("blackout_snapshot_codec_tests")
            .join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn roundtrip_produces_identical_json() {
        let state = make_test_state();
        assert_eq!(state.phase, Phase::Bidding);
        let json1 = encode_snapshot(&state).unwrap();
        let decoded = decode_snapshot(&json1).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(json1, encode_snapshot(&decoded).unwrap());
    }

    #[test]
    fn duplicated_card_returns_invariant_violation() {
        let mut state = make_test_state();
        state.trump_card = Some(state.players[0].hand[0]);
        let json = encode_snapshot(&state).unwrap();
        match restore_snapshot(&json) {
            Err(SnapshotError::InvariantViolation(msg)) => {
                assert!(msg.contains("unique_cards"), "got: {}", msg)
            }
            other => panic!("Expected InvariantViolation, got: {:?}", other),
        }
    }

    #[test]
    fn broken_schedule_returns_invariant_violation() {
        let mut state = make_test_state();
        state.tricks_in_round = 2;
        let json = encode_snapshot(&state).unwrap();
        match restore_snapshot(&json) {
            Err(SnapshotError::InvariantViolation(msg)) => {
                assert!(msg.contains("schedule"), "got: {}", msg)
            }
            other => panic!("Expected InvariantViolation, got: {:?}", other),
        }
    }

    #[test]
    fn file_roundtrip_matches() {
        let state = make_test_state();
        let path = test_dir("file_roundtrip").join("state.json");

        export_snapshot_to_file(&state, &path).unwrap();
        let imported = import_snapshot_from_file(&path).unwrap();
        assert_eq!(imported, state);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            encode_snapshot(&state).unwrap()
        );
    }

    #[test]
    fn corrupted_file_returns_deserialization_error() {
        let dir = test_dir("corrupted");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, b"{ not valid json !!!}").unwrap();

        match import_snapshot_from_file(&path) {
            Err(SnapshotError::DeserializationError(_)) => {}
            other => panic!("Expected DeserializationError, got: {:?}", other),
        }
    }

    #[test]
    fn impossible_trick_ceiling_returns_invariant_violation() {
        for bad in [0u8, 200] {
            let mut state = make_test_state();
            state.config.max_tricks = bad;
            let json = encode_snapshot(&state).unwrap();
            match restore_snapshot(&json) {
                Err(SnapshotError::InvariantViolation(msg)) => {
                    assert!(msg.contains("config"), "max_tricks {}: {}", bad, msg)
                }
                other => panic!("Expected InvariantViolation, got: {:?}", other),
            }
        }
    }

    #[test]
    fn missing_file_returns_io_error() {
        let path = test_dir("missing").join("nope.json");
        assert!(matches!(
            import_snapshot_from_file(&path),
            Err(SnapshotError::IoError(_))
        ));
    }

    #[test]
    fn missing_and_unknown_fields_are_rejected() {
        assert!(matches!(
            decode_snapshot(r#"{"phase":"setup"}"#),
            Err(SnapshotError::DeserializationError(_))
        ));

        let mut v: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&make_test_state()).unwrap()).unwrap();
        v["surprise"] = serde_json::json!(1);
        assert!(matches!(
            decode_snapshot(&v.to_string()),
            Err(SnapshotError::DeserializationError(_))
        ));
    }

    #[test]
    fn hash_is_deterministic_and_matches_file() {
        let state = make_test_state();
        let h1 = snapshot_hash(&state).unwrap();
        assert_eq!(h1, snapshot_hash(&state).unwrap());
        assert_eq!(h1.len(), 64);

        let path = test_dir("hash_parity").join("state.json");
        export_snapshot_to_file(&state, &path).unwrap();
        let file_digest = Sha256::digest(std::fs::read(&path).unwrap());
        let file_hash: String = file_digest.iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(h1, file_hash);
    }
}
