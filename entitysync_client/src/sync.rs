//! The client's per-tick sequence: drain server state, reconcile owned
//! entities against it, predict from local input, and interpolate remote
//! entities for rendering.

use crate::config::ClientSyncConfig;
use crate::error::ClientError;
use crate::input_collection::InputCollectionStrategy;
use crate::new_entity_handler::{CheckedNewEntityHandler, NewEntityHandler};
use entitysync_core::clock::Clock;
use entitysync_core::entity::{Entity, EntityCollection, SyncStrategy};
use entitysync_core::events::SharedEventEmitter;
use entitysync_core::id::EntityId;
use entitysync_core::message::{InputMessage, StateMessage};
use entitysync_core::state::{ApplyInput, Interpolate, Reckon};
use entitysync_transport::network::ClientTransport;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// `entityStateBuffers[entityId]`: the two (or more) most recent snapshots
/// bracketing the render timestamp, oldest first.
type StateBuffer<S> = VecDeque<(u64, S)>;

pub struct ClientEntitySynchronizer<S, I, H, C> {
    entities: EntityCollection<S>,
    player_entity_ids: HashSet<EntityId>,
    interpolatable_entity_ids: HashSet<EntityId>,
    reckonable_entity_ids: HashSet<EntityId>,
    entity_state_buffers: HashMap<EntityId, StateBuffer<S>>,
    pending_inputs: Vec<InputMessage<I>>,
    /// Starts at `1`, not `0`: the server's `lastProcessedInputSequenceNumber`
    /// defaults to `0` for an entity it has never received input for, so `0`
    /// must never be a sequence number a real batch can carry or that default
    /// would be indistinguishable from "sequence 0 was actually acknowledged".
    current_input_sequence_number: u64,
    last_input_collection_timestamp: Option<u64>,
    transport: ClientTransport<InputMessage<I>, StateMessage<S>>,
    clock: Arc<dyn Clock>,
    config: ClientSyncConfig,
    new_entity_handler: CheckedNewEntityHandler<H>,
    input_collection: C,
    pub synchronized: SharedEventEmitter<EntityCollection<S>>,
}

impl<S, I, H, C> ClientEntitySynchronizer<S, I, H, C>
where
    S: ApplyInput<Input = I> + Interpolate + Reckon + Clone,
    I: Clone,
    H: NewEntityHandler<S>,
    C: InputCollectionStrategy<I>,
{
    pub fn new(
        transport: ClientTransport<InputMessage<I>, StateMessage<S>>,
        clock: Arc<dyn Clock>,
        config: ClientSyncConfig,
        new_entity_handler: H,
        input_collection: C,
    ) -> Self {
        Self {
            entities: EntityCollection::new(),
            player_entity_ids: HashSet::new(),
            interpolatable_entity_ids: HashSet::new(),
            reckonable_entity_ids: HashSet::new(),
            entity_state_buffers: HashMap::new(),
            pending_inputs: Vec::new(),
            current_input_sequence_number: 1,
            last_input_collection_timestamp: None,
            transport,
            clock,
            config,
            new_entity_handler: CheckedNewEntityHandler::new(new_entity_handler),
            input_collection,
            synchronized: Default::default(),
        }
    }

    pub fn entities(&self) -> &EntityCollection<S> {
        &self.entities
    }

    pub fn pending_input_count(&self) -> usize {
        self.pending_inputs.len()
    }

    /// Mutable access to the input-collection collaborator, e.g. so a test
    /// harness can queue the next tick's inputs.
    pub fn input_collection_mut(&mut self) -> &mut C {
        &mut self.input_collection
    }

    /// `processServerMessages(); if not connected return; processInputs();
    /// interpolateEntities(); emit synchronized(entities)`. "Connected"
    /// means at least one entity is known locally.
    pub fn tick(&mut self) -> Result<(), ClientError> {
        self.process_server_messages()?;
        if self.entities.is_empty() {
            return Ok(());
        }
        self.process_inputs();
        self.interpolate_entities();
        self.synchronized.emit(&self.entities);
        Ok(())
    }

    fn process_server_messages(&mut self) -> Result<(), ClientError> {
        let now_ms = self.clock.now_ms();
        for message in self.transport.receive() {
            let id = message.entity.id.clone();
            if !self.entities.has(&id) {
                self.instantiate_entity(&message)?;
            }

            if self.player_entity_ids.contains(&id) {
                if let Some(entity) = self.entities.get_mut(&id) {
                    entity.state = message.entity.state.clone();
                }
                self.reconcile(&message);
            }

            if self.reckonable_entity_ids.contains(&id) {
                let elapsed_ms = now_ms.saturating_sub(message.timestamp_ms);
                if let Some(entity) = self.entities.get_mut(&id) {
                    // Reckon forward from the freshly received snapshot, not
                    // from the entity's own already-extrapolated state: the
                    // snapshot is the latest authoritative "last known state"
                    // and may itself carry a server-side correction.
                    entity.state = message.entity.state.reckon(elapsed_ms);
                }
            }

            if self.interpolatable_entity_ids.contains(&id) {
                self.entity_state_buffers
                    .entry(id)
                    .or_default()
                    .push_back((now_ms, message.entity.state.clone()));
            }
        }
        Ok(())
    }

    fn instantiate_entity(&mut self, message: &StateMessage<S>) -> Result<(), ClientError> {
        if message.entity.belongs_to_recipient_client {
            let (id, state) = self
                .new_entity_handler
                .create_local_entity_from_state_message(message)?;
            self.entities.add(Entity::new(id.clone(), state, SyncStrategy::Raw));
            self.player_entity_ids.insert(id);
        } else {
            let (id, state, strategy) = self
                .new_entity_handler
                .create_non_local_entity_from_state_message(message)?;
            self.entities.add(Entity::new(id.clone(), state, strategy));
            match strategy {
                SyncStrategy::Interpolation => {
                    self.interpolatable_entity_ids.insert(id.clone());
                    self.entity_state_buffers.entry(id).or_default();
                }
                SyncStrategy::DeadReckoning => {
                    self.reckonable_entity_ids.insert(id);
                }
                SyncStrategy::Raw => {}
            }
        }
        Ok(())
    }

    /// After adopting authoritative state for a locally owned entity: drop
    /// acknowledged inputs, then replay everything still pending, in
    /// sequence order, to the entity each targets.
    fn reconcile(&mut self, message: &StateMessage<S>) {
        let ack = message.last_processed_input_sequence_number;
        self.pending_inputs.retain(|i| i.input_sequence_number > ack);
        for pending in self.pending_inputs.clone() {
            if let Some(entity) = self.entities.get_mut(&pending.entity_id) {
                entity.state = entity.state.apply_input(&pending.input);
            } else {
                tracing::warn!(entity_id = %pending.entity_id, "pending input targets an entity no longer known locally");
            }
        }
    }

    /// Collect this tick's inputs, predict locally, send to the server, and
    /// remember them until the server acknowledges them. One sequence
    /// number is assigned per batch, not per input, so a single
    /// acknowledgement can cover every entity the client owns.
    fn process_inputs(&mut self) {
        let now_ms = self.clock.now_ms();
        let last_ms = self.last_input_collection_timestamp.unwrap_or(now_ms);
        let elapsed_ms = now_ms.saturating_sub(last_ms);
        self.last_input_collection_timestamp = Some(now_ms);

        let inputs = self.input_collection.get_inputs(elapsed_ms);
        if inputs.is_empty() {
            return;
        }

        let sequence_number = self.current_input_sequence_number;
        let mut batch = Vec::with_capacity(inputs.len());
        for (entity_id, input) in inputs {
            if let Some(entity) = self.entities.get_mut(&entity_id) {
                entity.state = entity.state.apply_input(&input);
            }
            let message = InputMessage {
                entity_id,
                input,
                input_sequence_number: sequence_number,
            };
            batch.push(message.clone());
            self.pending_inputs.push(message);
        }
        if let Err(err) = self.transport.send(batch) {
            tracing::warn!(?err, "dropping an input batch: transport is not connected");
        }
        self.current_input_sequence_number += 1;
    }

    /// `renderTs = now - 1000 / serverUpdateRateHz`. For every non-owned
    /// interpolatable entity, evict buffered snapshots the render timestamp
    /// has passed and, once two snapshots bracket it, set the entity's
    /// state to the ratio-weighted interpolation between them.
    fn interpolate_entities(&mut self) {
        let now_ms = self.clock.now_ms();
        let render_ts = now_ms.saturating_sub((1000.0 / self.config.server_update_rate_hz) as u64);

        for id in self.interpolatable_entity_ids.iter() {
            if self.player_entity_ids.contains(id) {
                continue;
            }
            let Some(buffer) = self.entity_state_buffers.get_mut(id) else {
                continue;
            };
            while buffer.len() >= 2 && buffer[1].0 <= render_ts {
                buffer.pop_front();
            }
            if buffer.len() >= 2 && buffer[0].0 <= render_ts && render_ts <= buffer[1].0 {
                let span = buffer[1].0 - buffer[0].0;
                let ratio = if span == 0 { 0.0 } else { (render_ts - buffer[0].0) as f64 / span as f64 };
                let interpolated = S::interpolate(&buffer[0].1, &buffer[1].1, ratio);
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.state = interpolated;
                }
            }
        }
    }
}
