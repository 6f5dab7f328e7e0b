use entitysync_core::id::EntityId;
use thiserror::Error;

/// Fatal errors raised while running the client's tick loop.
///
/// The error table this mirrors also lists `UnexpectedSyncStrategy` for the
/// new-entity classification step, but here that classification is an
/// exhaustive match over [`entitysync_core::entity::SyncStrategy`], so an
/// unrecognized strategy cannot reach this type — the compiler eliminates
/// the case instead of a runtime check catching it. `UnknownEntity` is
/// likewise absent: reconciliation only ever touches entities already in
/// the local collection, a dangling `entity_id` is logged and its input
/// silently skipped rather than surfaced as an error.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("new entity handler returned id {returned} for a message about {expected}")]
    EntityIdMismatch {
        expected: EntityId,
        returned: EntityId,
    },
}
