//! `InMemoryNetwork`: the per-client-slot hub, built on
//! top of [`crate::buffer::TwoWayBuffer`]. Owns queued messages between
//! enqueue and dequeue; clients and the server each own only the handle
//! they were given.

use crate::buffer::TwoWayBuffer;
use crate::refcount::RefCountRegistry;
use entitysync_core::clock::Clock;
use entitysync_core::events::SharedEventEmitter;
use entitysync_core::id::ClientId;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// The client's handle: receives `S2C` messages (state), sends `C2S`
/// messages (input). `clientSentMessages` fires synchronously on send.
pub struct ClientTransport<C2S, S2C> {
    pub client_id: ClientId,
    buffer: TwoWayBuffer<S2C, C2S>,
}

impl<C2S: Clone, S2C> ClientTransport<C2S, S2C> {
    pub fn send(&self, messages: Vec<C2S>) -> Result<(), crate::error::TransportError> {
        self.buffer.send(messages)
    }

    pub fn receive(&self) -> Vec<S2C> {
        self.buffer.receive()
    }

    pub fn on_send(&self) -> &SharedEventEmitter<Vec<C2S>> {
        &self.buffer.on_send
    }
}

/// Server-side hub: one [`TwoWayBuffer`] per connected client slot, plus the
/// introspection-only refcount registry for broadcasts.
pub struct InMemoryNetwork<C2S, S2C> {
    clock: Arc<dyn Clock>,
    lag_ms: u64,
    slots: Mutex<IndexMap<ClientId, TwoWayBuffer<C2S, S2C>>>,
    refcounts: Arc<RefCountRegistry>,
    pub server_sent: SharedEventEmitter<(ClientId, Vec<S2C>)>,
}

impl<C2S, S2C: Clone> InMemoryNetwork<C2S, S2C> {
    pub fn new(lag_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            lag_ms,
            slots: Mutex::new(IndexMap::new()),
            refcounts: Arc::new(RefCountRegistry::new()),
            server_sent: Default::default(),
        }
    }

    /// Connect a new client slot, returning the client-side handle.
    pub fn connect_client(&self, client_id: ClientId) -> ClientTransport<C2S, S2C> {
        let (client_ep, server_ep) =
            TwoWayBuffer::<C2S, S2C>::pair::<C2S, S2C>(self.lag_ms, self.clock.clone());
        self.slots.lock().insert(client_id, server_ep);
        ClientTransport {
            client_id,
            buffer: client_ep,
        }
    }

    /// Ids of connected clients, in connection order — the order in which
    /// the server drains per-client input (implementation-defined).
    pub fn connected_client_ids(&self) -> Vec<ClientId> {
        self.slots.lock().keys().copied().collect()
    }

    /// Drain the inputs sent by one client.
    pub fn receive_from_client(&self, client_id: ClientId) -> Vec<C2S> {
        let received = self.slots.lock().get(&client_id).map(|ep| ep.receive());
        match received {
            Some(messages) => messages,
            None => {
                tracing::trace!(%client_id, "receive_from_client called for an unconnected slot");
                Vec::new()
            }
        }
    }

    /// Send a targeted batch of state messages to a single client.
    pub fn send_to_client(
        &self,
        client_id: ClientId,
        messages: Vec<S2C>,
    ) -> Result<(), crate::error::TransportError> {
        let slots = self.slots.lock();
        let ep = match slots.get(&client_id) {
            Some(ep) => ep,
            None => {
                tracing::trace!(%client_id, "send_to_client called for an unconnected slot; dropping");
                return Ok(());
            }
        };
        ep.send(messages.clone())?;
        self.server_sent.emit(&(client_id, messages));
        Ok(())
    }

    /// Fan the same logical batch out to several clients, each potentially
    /// with a different per-recipient view (`per_client` builds the
    /// messages for one client). Registers one refcounted batch per
    /// recipient, purely for introspection.
    pub fn broadcast(
        &self,
        client_ids: &[ClientId],
        mut per_client: impl FnMut(ClientId) -> Vec<S2C>,
    ) -> Result<(), crate::error::TransportError>
    where
        C2S: 'static,
        S2C: 'static,
    {
        let batch_id = self.refcounts.register(client_ids.len());
        let slots = self.slots.lock();
        for &client_id in client_ids {
            let Some(ep) = slots.get(&client_id) else {
                tracing::trace!(%client_id, "broadcast skipped an unconnected slot");
                continue;
            };
            let messages = per_client(client_id);
            self.server_sent.emit(&(client_id, messages.clone()));
            ep.send_inner(messages, self.lag_ms, Some((batch_id, self.refcounts.clone())))?;
        }
        Ok(())
    }

    pub fn refcounts(&self) -> &RefCountRegistry {
        &self.refcounts
    }
}
