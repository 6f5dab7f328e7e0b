//! The in-memory `TwoWayBuffer<Recv, Send>` testing collaborator.
//!
//! Two endpoints share a pair of queues, one per direction. Each enqueued
//! batch records a `ready_at_ms = now_ms + lag_ms`; `receive` drains every
//! batch whose ready time has passed, in FIFO order, stopping at the first
//! batch that isn't ready yet — a batch at the head of the line blocks
//! everything behind it, even a batch with a shorter lag, so per-sender
//! ordering is never violated.

use crate::error::TransportError;
use crate::refcount::{BatchId, RefCountRegistry};
use entitysync_core::clock::Clock;
use entitysync_core::events::SharedEventEmitter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct ReadyBatch<M> {
    messages: Vec<M>,
    ready_at_ms: u64,
    /// Set only for server-sent batches fanned out to more than one
    /// client; see [`crate::refcount::RefCountRegistry`].
    refcount: Option<(BatchId, Arc<RefCountRegistry>)>,
}

/// One endpoint's view of a bidirectional channel: it receives `Recv`
/// messages and sends `Send` messages. Construct a pair with
/// [`TwoWayBuffer::pair`].
pub struct TwoWayBuffer<Recv, Send> {
    clock: Arc<dyn Clock>,
    lag_ms: u64,
    connected: Arc<AtomicBool>,
    inbox: Arc<Mutex<VecDeque<ReadyBatch<Recv>>>>,
    outbox: Arc<Mutex<VecDeque<ReadyBatch<Send>>>>,
    pub on_send: SharedEventEmitter<Vec<Send>>,
}

impl<Recv, Send> TwoWayBuffer<Recv, Send> {
    /// Create a connected pair of endpoints: endpoint one receives `B` and
    /// sends `A`; endpoint two receives `A` and sends `B`. `lag_ms` applies
    /// uniformly to both directions — pass asymmetric values by
    /// constructing two independent pairs if a scenario needs that.
    pub fn pair<A, B>(
        lag_ms: u64,
        clock: Arc<dyn Clock>,
    ) -> (TwoWayBuffer<B, A>, TwoWayBuffer<A, B>) {
        let a_to_b = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a = Arc::new(Mutex::new(VecDeque::new()));
        let one = TwoWayBuffer {
            clock: clock.clone(),
            lag_ms,
            connected: Arc::new(AtomicBool::new(true)),
            inbox: b_to_a.clone(),
            outbox: a_to_b.clone(),
            on_send: Default::default(),
        };
        let two = TwoWayBuffer {
            clock,
            lag_ms,
            connected: Arc::new(AtomicBool::new(true)),
            inbox: a_to_b,
            outbox: b_to_a,
            on_send: Default::default(),
        };
        (one, two)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Send a batch of messages using this endpoint's configured lag.
    /// Fails with [`TransportError::SendBeforeConnect`] if disconnected.
    pub fn send(&self, messages: Vec<Send>) -> Result<(), TransportError>
    where
        Send: Clone,
    {
        self.send_with_lag(messages, self.lag_ms)
    }

    /// Send a batch with an explicit per-call latency, overriding the
    /// endpoint's configured default — this is the "configurable
    /// per-message latency" the transport exists to provide.
    pub fn send_with_lag(&self, messages: Vec<Send>, lag_ms: u64) -> Result<(), TransportError>
    where
        Send: Clone,
    {
        self.send_inner(messages, lag_ms, None)
    }

    pub(crate) fn send_inner(
        &self,
        messages: Vec<Send>,
        lag_ms: u64,
        refcount: Option<(BatchId, Arc<RefCountRegistry>)>,
    ) -> Result<(), TransportError>
    where
        Send: Clone,
    {
        if !self.is_connected() {
            return Err(TransportError::SendBeforeConnect);
        }
        self.on_send.emit(&messages);
        let ready_at_ms = self.clock.now_ms() + lag_ms;
        self.outbox.lock().push_back(ReadyBatch {
            messages,
            ready_at_ms,
            refcount,
        });
        Ok(())
    }

    /// Drain every batch in the inbox whose ready time has passed, in
    /// send order, stopping at the first batch that is not yet ready.
    pub fn receive(&self) -> Vec<Recv> {
        let now_ms = self.clock.now_ms();
        let mut inbox = self.inbox.lock();
        let mut out = Vec::new();
        while let Some(front) = inbox.front() {
            if front.ready_at_ms > now_ms {
                break;
            }
            let batch = inbox.pop_front().expect("front just checked Some");
            if let Some((id, registry)) = &batch.refcount {
                registry.mark_received(*id);
            }
            out.extend(batch.messages);
        }
        out
    }
}

impl<'a, Recv, Send> IntoIterator for &'a TwoWayBuffer<Recv, Send> {
    type Item = Recv;
    type IntoIter = std::vec::IntoIter<Recv>;

    fn into_iter(self) -> Self::IntoIter {
        self.receive().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitysync_core::clock::VirtualClock;
    use test_log::test;

    fn clock(start_ms: u64) -> (Arc<VirtualClock>, Arc<dyn Clock>) {
        let vc = Arc::new(VirtualClock::new(start_ms));
        let dyn_clock: Arc<dyn Clock> = vc.clone();
        (vc, dyn_clock)
    }

    #[test]
    fn send_before_connect_is_rejected() {
        let (_vc, c) = clock(0);
        let (one, _two) = TwoWayBuffer::<u8, u8>::pair::<u8, u8>(0, c);
        one.disconnect();
        assert_eq!(one.send(vec![1]).unwrap_err(), TransportError::SendBeforeConnect);
    }

    #[test]
    fn fifo_delivery_with_no_loss_or_duplication() {
        let (vc, c) = clock(0);
        let (one, two) = TwoWayBuffer::<u8, u8>::pair::<u8, u8>(0, c);
        one.send(vec![1, 2]).unwrap();
        one.send(vec![3]).unwrap();
        vc.advance(1);
        assert_eq!(two.receive(), vec![1, 2, 3]);
        assert_eq!(two.receive(), Vec::<u8>::new());
    }

    #[test]
    fn head_of_line_ordering_blocks_ready_messages_behind_a_stale_one() {
        // send(m1, lag=100) at t=0, send(m2, lag=10) at t=5. At t=50,
        // receive() is empty (m1 not ready blocks m2 behind it). At t=100,
        // receive() returns [m1, m2] in that order.
        let (vc, c) = clock(0);
        let (one, two) = TwoWayBuffer::<&'static str, &'static str>::pair::<&'static str, &'static str>(0, c);
        one.send_with_lag(vec!["m1"], 100).unwrap();
        vc.advance(5);
        one.send_with_lag(vec!["m2"], 10).unwrap();
        vc.advance(45); // now t=50
        assert!(two.receive().is_empty());
        vc.advance(50); // now t=100
        assert_eq!(two.receive(), vec!["m1", "m2"]);
    }
}
