//! Hand-written protobuf types for the Blackout event log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers are part of the on-disk format; never renumber.

use prost::Message;

// ── Event Envelope ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint64, tag = "2")]
    pub logical_time: u64,
    #[prost(uint32, tag = "3")]
    pub schema_version: u32,
    #[prost(message, optional, tag = "4")]
    pub event: Option<ProtoEvent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEvent {
    #[prost(oneof = "EventKind", tags = "1, 2, 3, 4")]
    pub kind: Option<EventKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventKind {
    #[prost(message, tag = "1")]
    InitializeGame(InitializeGame),
    #[prost(message, tag = "2")]
    DealRound(DealRound),
    #[prost(message, tag = "3")]
    PlaceBid(PlaceBid),
    #[prost(message, tag = "4")]
    PlayCard(PlayCard),
}

// ── Event Types ────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct InitializeGame {
    #[prost(uint32, tag = "1")]
    pub num_players: u32,
    #[prost(uint32, tag = "2")]
    pub max_tricks: u32,
    #[prost(uint32, tag = "3")]
    pub first_dealer: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct DealRound {
    /// One byte per card: deck index 0..52, top of the deck first.
    #[prost(bytes = "vec", tag = "1")]
    pub deck_order: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PlaceBid {
    #[prost(uint32, tag = "1")]
    pub seat: u32,
    #[prost(uint32, tag = "2")]
    pub bid: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PlayCard {
    #[prost(uint32, tag = "1")]
    pub seat: u32,
    /// Deck index of the card (0..52).
    #[prost(uint32, tag = "2")]
    pub card: u32,
}
