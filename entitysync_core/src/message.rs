//! Wire-agnostic message shapes exchanged over the transport.
//!
//! Encoding is explicitly the transport's concern; these are plain
//! structured values passed by the in-memory transport, not byte buffers.

use crate::id::EntityId;

/// `{entityId, input, inputSequenceNumber, kind: Input}`. Sequence numbers
/// are per-client, monotonically non-decreasing, assigned when a batch of
/// inputs is collected (see `entitysync_client::sync::process_inputs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMessage<I> {
    pub entity_id: EntityId,
    pub input: I,
    pub input_sequence_number: u64,
}

/// A single entity's replicated state as carried by a `StateMessage`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate<S> {
    pub id: EntityId,
    pub state: S,
    /// Precisely true for entities the recipient client owns.
    pub belongs_to_recipient_client: bool,
}

/// `{entity, lastProcessedInputSequenceNumber, timestampMs, kind: State}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMessage<S> {
    pub entity: EntityUpdate<S>,
    pub last_processed_input_sequence_number: u64,
    pub timestamp_ms: u64,
}

/// A `(entityId, state, timestampMs)` snapshot as produced by the server at
/// its tick rate, before it's fanned out into per-recipient `StateMessage`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    pub entity_id: EntityId,
    pub state: S,
    pub timestamp_ms: u64,
}

/// The `kind` discriminator that lets `InputMessage` and `StateMessage`
/// share a single typed channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<I, S> {
    Input(InputMessage<I>),
    State(StateMessage<S>),
}
