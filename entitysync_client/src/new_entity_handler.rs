//! Instantiates local entities the first time a `StateMessage` mentions
//! them, and classifies non-local entities by sync strategy. Wire state
//! doesn't carry a strategy assignment, so a non-local entity's strategy is
//! a local decision this collaborator makes, not something replicated.

use crate::error::ClientError;
use entitysync_core::entity::SyncStrategy;
use entitysync_core::id::EntityId;
use entitysync_core::message::StateMessage;

/// `createLocalEntityFromStateMessage` / `createNonLocalEntityFromStateMessage`.
pub trait NewEntityHandler<S> {
    fn create_local_entity_from_state_message(&self, message: &StateMessage<S>) -> (EntityId, S);

    fn create_non_local_entity_from_state_message(
        &self,
        message: &StateMessage<S>,
    ) -> (EntityId, S, SyncStrategy);
}

/// Wraps any [`NewEntityHandler`] and rejects a returned id that doesn't
/// match the message it was built from, rather than trusting the
/// collaborator silently.
pub struct CheckedNewEntityHandler<H> {
    inner: H,
}

impl<H> CheckedNewEntityHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn create_local_entity_from_state_message<S>(
        &self,
        message: &StateMessage<S>,
    ) -> Result<(EntityId, S), ClientError>
    where
        H: NewEntityHandler<S>,
    {
        let (id, state) = self.inner.create_local_entity_from_state_message(message);
        if id != message.entity.id {
            return Err(ClientError::EntityIdMismatch {
                expected: message.entity.id.clone(),
                returned: id,
            });
        }
        Ok((id, state))
    }

    pub fn create_non_local_entity_from_state_message<S>(
        &self,
        message: &StateMessage<S>,
    ) -> Result<(EntityId, S, SyncStrategy), ClientError>
    where
        H: NewEntityHandler<S>,
    {
        let (id, state, strategy) = self.inner.create_non_local_entity_from_state_message(message);
        if id != message.entity.id {
            return Err(ClientError::EntityIdMismatch {
                expected: message.entity.id.clone(),
                returned: id,
            });
        }
        Ok((id, state, strategy))
    }
}
