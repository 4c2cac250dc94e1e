//! Proto ↔ Kernel conversion bridge.
//!
//! Converts between protobuf wire types (proto_types.rs) and the
//! kernel's typed `EventEnvelope`. Cards travel as deck indices.

use blackout_kernel::cards::Card;
use blackout_kernel::events::{EventEnvelope, GameEvent};

use crate::error::{Result, RuntimeError};
use crate::proto_types::*;

/// Convert a protobuf EventEnvelope to the kernel's EventEnvelope.
///
/// Fails if the frame carries no event or an impossible card/number.
pub fn proto_to_kernel(proto: &ProtoEventEnvelope) -> Result<EventEnvelope> {
    let corrupt = |reason: &str| RuntimeError::CorruptEvent {
        sequence: proto.sequence,
        reason: reason.to_string(),
    };

    let kind = proto
        .event
        .as_ref()
        .and_then(|e| e.kind.as_ref())
        .ok_or_else(|| corrupt("frame has no event"))?;

    let small = |v: u32, what: &str| -> Result<u8> {
        u8::try_from(v).map_err(|_| corrupt(&format!("{} {} out of range", what, v)))
    };

    let event = match kind {
        EventKind::InitializeGame(ig) => GameEvent::InitializeGame {
            num_players: ig.num_players as usize,
            max_tricks: small(ig.max_tricks, "max_tricks")?,
            first_dealer: ig.first_dealer as usize,
        },
        EventKind::DealRound(dr) => GameEvent::DealRound {
            deck_order: dr.deck_order.clone(),
        },
        EventKind::PlaceBid(pb) => GameEvent::PlaceBid {
            seat: pb.seat as usize,
            bid: small(pb.bid, "bid")?,
        },
        EventKind::PlayCard(pc) => {
            let card = Card::from_index(small(pc.card, "card index")?)
                .ok_or_else(|| corrupt(&format!("card index {} out of range", pc.card)))?;
            GameEvent::PlayCard {
                seat: pc.seat as usize,
                card,
            }
        }
    };

    Ok(EventEnvelope {
        sequence: proto.sequence,
        logical_time: proto.logical_time,
        schema_version: proto.schema_version,
        event,
    })
}

/// Convert a kernel EventEnvelope to a protobuf EventEnvelope.
///
/// Used for persisting events to the append-only binary log.
pub fn kernel_to_proto(kernel: &EventEnvelope) -> ProtoEventEnvelope {
    let kind = match &kernel.event {
        GameEvent::InitializeGame {
            num_players,
            max_tricks,
            first_dealer,
        } => EventKind::InitializeGame(InitializeGame {
            num_players: *num_players as u32,
            max_tricks: *max_tricks as u32,
            first_dealer: *first_dealer as u32,
        }),
        GameEvent::DealRound { deck_order } => EventKind::DealRound(DealRound {
            deck_order: deck_order.clone(),
        }),
        GameEvent::PlaceBid { seat, bid } => EventKind::PlaceBid(PlaceBid {
            seat: *seat as u32,
            bid: *bid as u32,
        }),
        GameEvent::PlayCard { seat, card } => EventKind::PlayCard(PlayCard {
            seat: *seat as u32,
            card: card.index() as u32,
        }),
    };

    ProtoEventEnvelope {
        sequence: kernel.sequence,
        logical_time: kernel.logical_time,
        schema_version: kernel.schema_version,
        event: Some(ProtoEvent { kind: Some(kind) }),
    }
}
