//! Append-only event store: binary protobuf log.
//!
//! On disk the log is a run of frames, each a little-endian `u32` body
//! length followed by one encoded `ProtoEventEnvelope`. A frame is written
//! with a single call and fsynced; if any part of that fails the file is
//! cut back to its previous length, so a failed append never leaves a
//! partial frame for the next append to land behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::{debug, trace, warn};

use crate::proto_types::ProtoEventEnvelope;

/// Largest frame body accepted when reading a log back.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

/// Append-only event log backed by a binary file.
#[derive(Debug)]
pub struct EventStore {
    path: PathBuf,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create a log. An existing file is read in full so that a
    /// damaged log fails here rather than on the next append.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let last_sequence = match fs::read(path) {
            Ok(bytes) => decode_frames(&bytes)?
                .last()
                .map_or(0, |e| e.sequence),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };

        debug!(path = %path.display(), last_sequence, "event store opened");
        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    /// Append one event. Its sequence must be exactly `last_sequence + 1`.
    pub fn append_event(&mut self, event: &ProtoEventEnvelope) -> io::Result<()> {
        self.append_with(event, |file, frame| {
            file.write_all(frame)?;
            file.sync_all()
        })
    }

    /// Append using `write` to put the frame on disk. On error the file is
    /// truncated back to where the frame started.
    fn append_with<F>(&mut self, event: &ProtoEventEnvelope, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Sequence violation in event store: expected {}, got {}",
                    expected, event.sequence
                ),
            ));
        }

        let frame = encode_frame(event);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();

        if let Err(err) = write(&mut file, &frame) {
            warn!(
                sequence = event.sequence,
                error = %err,
                "append failed, truncating log to last good frame"
            );
            file.set_len(start)?;
            file.sync_all()?;
            return Err(err);
        }

        trace!(sequence = event.sequence, bytes = frame.len(), "event appended");
        self.last_sequence = event.sequence;
        Ok(())
    }

    /// Load all events from the log in sequence order.
    pub fn load_all_events(&self) -> io::Result<Vec<ProtoEventEnvelope>> {
        match fs::read(&self.path) {
            Ok(bytes) => decode_frames(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Length prefix and body in one buffer.
fn encode_frame(event: &ProtoEventEnvelope) -> Vec<u8> {
    let body = event.encode_to_vec();
    let mut frame = Vec::with_capacity(LEN_PREFIX + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    frame
}

/// Split a whole log into events. Any bad length, short frame or
/// undecodable body fails the lot.
fn decode_frames(mut bytes: &[u8]) -> io::Result<Vec<ProtoEventEnvelope>> {
    let mut events = Vec::new();

    while !bytes.is_empty() {
        let Some((prefix, rest)) = bytes.split_first_chunk::<LEN_PREFIX>() else {
            return Err(invalid(format!(
                "Truncated length prefix after {} events",
                events.len()
            )));
        };
        let len = u32::from_le_bytes(*prefix) as usize;
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(invalid(format!("Invalid frame length: {}", len)));
        }
        if rest.len() < len {
            return Err(invalid(format!(
                "Truncated frame after {} events: need {} bytes, have {}",
                events.len(),
                len,
                rest.len()
            )));
        }

        let (body, tail) = rest.split_at(len);
        let event = ProtoEventEnvelope::decode(body)
            .map_err(|e| invalid(format!("Protobuf decode error: {}", e)))?;
        events.push(event);
        bytes = tail;
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto_types::{EventKind, PlaceBid, ProtoEvent};

    fn envelope(sequence: u64) -> ProtoEventEnvelope {
        ProtoEventEnvelope {
            sequence,
            logical_time: sequence,
            schema_version: 1,
            event: Some(ProtoEvent {
                kind: Some(EventKind::PlaceBid(PlaceBid { seat: 0, bid: 1 })),
            }),
        }
    }

    fn log_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("blackout_event_store_tests")
            .join(name);
        let _ = fs::remove_dir_all(&dir);
        dir.join("events.log")
    }

    #[test]
    fn torn_write_is_rolled_back() {
        let path = log_path("torn_write");
        let mut store = EventStore::open(&path).unwrap();
        store.append_event(&envelope(1)).unwrap();
        let good_len = fs::metadata(&path).unwrap().len();

        // Length prefix and half the body reach the disk, then the device fails.
        let err = store
            .append_with(&envelope(2), |file, frame| {
                file.write_all(&frame[..frame.len() / 2])?;
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(fs::metadata(&path).unwrap().len(), good_len);
        assert_eq!(store.last_sequence(), 1);

        store.append_event(&envelope(2)).unwrap();
        let events = EventStore::open(&path).unwrap().load_all_events().unwrap();
        assert_eq!(
            events.iter().map(|e| e.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn frames_decode_in_order() {
        let mut bytes = encode_frame(&envelope(1));
        bytes.extend(encode_frame(&envelope(2)));
        let events = decode_frames(&bytes).unwrap();
        assert_eq!(events, vec![envelope(1), envelope(2)]);
    }

    #[test]
    fn short_prefix_and_zero_length_rejected() {
        assert!(decode_frames(&[1, 0]).is_err());
        assert!(decode_frames(&[0, 0, 0, 0]).is_err());
    }
}
