#![forbid(unsafe_code)]

//! Blackout: Rust Runtime
//!
//! Wraps the kernel with persistence, replay, snapshots, session
//! management, drift detection and a terminal console.
//!
//! No game rules live here: all transitions and invariants
//! are delegated to the kernel.

pub mod config;
pub mod console;
pub mod drift;
pub mod error;
pub mod event_store;
pub mod proto_bridge;
pub mod proto_types;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod snapshot_codec;

pub use error::{Result, RuntimeError};
pub use session::{Session, SharedSession};
