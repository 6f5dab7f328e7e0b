//! The server's per-tick loop: drain client inputs, apply them
//! authoritatively, snapshot the result into history, and broadcast.

use crate::config::ServerSyncConfig;
use crate::error::ServerError;
use entitysync_core::clock::Clock;
use entitysync_core::entity::{Entity, EntityCollection, SyncStrategy};
use entitysync_core::history::TimestampedBuffer;
use entitysync_core::id::{ClientId, EntityId};
use entitysync_core::message::{EntityUpdate, InputMessage, StateMessage};
use entitysync_core::state::ApplyInput;
use entitysync_transport::network::InMemoryNetwork;
use std::collections::HashMap;
use std::sync::Arc;

/// Authoritative per-entity state, lag-compensation history, and the
/// bookkeeping needed to acknowledge processed input back to its owner.
pub struct ServerEntitySynchronizer<S, I> {
    entities: EntityCollection<S>,
    history: HashMap<EntityId, TimestampedBuffer<S>>,
    /// `lastProcessedInputSequenceNumber[clientId, entityId]`.
    last_processed: HashMap<(ClientId, EntityId), u64>,
    owner_of: HashMap<EntityId, ClientId>,
    network: Arc<InMemoryNetwork<InputMessage<I>, StateMessage<S>>>,
    clock: Arc<dyn Clock>,
    config: ServerSyncConfig,
}

impl<S, I> ServerEntitySynchronizer<S, I>
where
    S: ApplyInput<Input = I> + Clone,
{
    pub fn new(
        network: Arc<InMemoryNetwork<InputMessage<I>, StateMessage<S>>>,
        clock: Arc<dyn Clock>,
        config: ServerSyncConfig,
    ) -> Self {
        Self {
            entities: EntityCollection::new(),
            history: HashMap::new(),
            last_processed: HashMap::new(),
            owner_of: HashMap::new(),
            network,
            clock,
            config,
        }
    }

    /// Register a new authoritative entity. `owner` is the client whose
    /// `StateMessage.entity.belongsToRecipientClient` is set true for it;
    /// `None` for server-owned (e.g. NPC) entities.
    pub fn spawn_entity(&mut self, id: EntityId, state: S, strategy: SyncStrategy, owner: Option<ClientId>) {
        if let Some(owner) = owner {
            self.owner_of.insert(id.clone(), owner);
        }
        self.history
            .entry(id.clone())
            .or_insert_with(|| TimestampedBuffer::new(self.config.history_window_ms));
        self.entities.add(Entity::new(id, state, strategy));
    }

    pub fn entities(&self) -> &EntityCollection<S> {
        &self.entities
    }

    pub fn history_for(&self, entity_id: &EntityId) -> Option<&TimestampedBuffer<S>> {
        self.history.get(entity_id)
    }

    pub fn history_for_mut(&mut self, entity_id: &EntityId) -> Option<&mut TimestampedBuffer<S>> {
        self.history.get_mut(entity_id)
    }

    /// One pass of the server's fixed-rate loop:
    /// 1. drain and apply every connected client's pending inputs,
    /// 2. snapshot each entity's resulting state into its history,
    /// 3. broadcast a `StateMessage` for every `(client, entity)` pair.
    pub fn tick(&mut self) -> Result<(), ServerError> {
        let now_ms = self.clock.now_ms();
        let client_ids = self.network.connected_client_ids();

        for &client_id in &client_ids {
            for input in self.network.receive_from_client(client_id) {
                self.apply_input(client_id, input);
            }
        }

        for (id, entity) in self.entities.iter() {
            let buffer = self
                .history
                .entry(id.clone())
                .or_insert_with(|| TimestampedBuffer::new(self.config.history_window_ms));
            buffer.record(now_ms, entity.state.clone())?;
        }

        let entities = &self.entities;
        let owner_of = &self.owner_of;
        let last_processed = &self.last_processed;
        let _ = self.network.broadcast(&client_ids, |client_id| {
            entities
                .iter()
                .map(|(id, entity)| StateMessage {
                    entity: EntityUpdate {
                        id: id.clone(),
                        state: entity.state.clone(),
                        belongs_to_recipient_client: owner_of.get(id) == Some(&client_id),
                    },
                    // `0` here means "no input from this client has ever been
                    // processed for this entity" — a real sequence number is
                    // never `0` (the client assigns them starting at `1`), so
                    // the default can't be confused with an acknowledgement.
                    last_processed_input_sequence_number: last_processed
                        .get(&(client_id, id.clone()))
                        .copied()
                        .unwrap_or(0),
                    timestamp_ms: now_ms,
                })
                .collect()
        });

        Ok(())
    }

    fn apply_input(&mut self, client_id: ClientId, input: InputMessage<I>) {
        let Some(entity) = self.entities.get_mut(&input.entity_id) else {
            tracing::warn!(entity_id = %input.entity_id, client_id = %client_id, "input referenced an unknown entity; dropping");
            return;
        };
        entity.state = entity.state.apply_input(&input.input);
        self.last_processed
            .insert((client_id, input.entity_id), input.input_sequence_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitysync_core::clock::VirtualClock;
    use test_log::test;

    #[derive(Debug, Clone, PartialEq)]
    struct Pos(f64);

    impl ApplyInput for Pos {
        type Input = f64;
        fn apply_input(&self, delta: &f64) -> Self {
            Pos(self.0 + delta)
        }
    }

    #[test]
    fn tick_applies_inputs_tracks_acks_and_broadcasts_state() {
        let vc = Arc::new(VirtualClock::new(1_000));
        let clock: Arc<dyn Clock> = vc.clone();
        let network: Arc<InMemoryNetwork<InputMessage<f64>, StateMessage<Pos>>> =
            Arc::new(InMemoryNetwork::new(0, clock.clone()));

        let client_handle = network.connect_client(ClientId(1));
        let mut server = ServerEntitySynchronizer::new(network.clone(), clock, ServerSyncConfig::default());
        server.spawn_entity(EntityId::from("p1"), Pos(0.0), SyncStrategy::Raw, Some(ClientId(1)));

        client_handle
            .send(vec![InputMessage {
                entity_id: EntityId::from("p1"),
                input: 5.0,
                input_sequence_number: 1,
            }])
            .unwrap();
        vc.advance(0);

        server.tick().unwrap();

        assert_eq!(server.entities().get(&EntityId::from("p1")).unwrap().state, Pos(5.0));
        assert_eq!(server.history_for(&EntityId::from("p1")).unwrap().len(), 1);

        let updates = client_handle.receive();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].entity.state, Pos(5.0));
        assert!(updates[0].entity.belongs_to_recipient_client);
        assert_eq!(updates[0].last_processed_input_sequence_number, 1);
    }

    #[test]
    fn input_for_unknown_entity_is_dropped_without_failing_the_tick() {
        let vc = Arc::new(VirtualClock::new(0));
        let clock: Arc<dyn Clock> = vc;
        let network: Arc<InMemoryNetwork<InputMessage<f64>, StateMessage<Pos>>> =
            Arc::new(InMemoryNetwork::new(0, clock.clone()));
        let client_handle = network.connect_client(ClientId(1));
        let mut server = ServerEntitySynchronizer::new(network, clock, ServerSyncConfig::default());

        client_handle
            .send(vec![InputMessage {
                entity_id: EntityId::from("ghost"),
                input: 1.0,
                input_sequence_number: 1,
            }])
            .unwrap();

        assert!(server.tick().is_ok());
    }
}
