//! The device-polling collaborator: turns elapsed time into a batch of
//! per-entity inputs. Any actual device I/O is the implementor's problem;
//! this crate only consumes the resulting values.

use entitysync_core::id::EntityId;

/// `getInputs(elapsedMs) -> sequence<{entityId, input}>`.
pub trait InputCollectionStrategy<I> {
    fn get_inputs(&mut self, elapsed_ms: u64) -> Vec<(EntityId, I)>;
}

#[cfg(test)]
pub(crate) struct FixedInputs<I> {
    pub queued: Vec<(EntityId, I)>,
}

#[cfg(test)]
impl<I: Clone> InputCollectionStrategy<I> for FixedInputs<I> {
    fn get_inputs(&mut self, _elapsed_ms: u64) -> Vec<(EntityId, I)> {
        std::mem::take(&mut self.queued)
    }
}
