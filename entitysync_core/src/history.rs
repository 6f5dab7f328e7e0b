//! Timestamped history ring: an append-only-by-time, ordered sequence of
//! authoritative snapshots, bounded by a rolling time window.
//!
//! Lag compensation needs to locate the historical state at a client's
//! perceived time, fold a delayed action into it, then rewrite the
//! subsequent entries to reflect the change without disturbing their
//! timestamps. A deque ordered oldest-to-newest, searched with
//! `partition_point`, gives logarithmic slicing and O(1) amortized
//! append/evict, keyed here by a wall-clock timestamp in milliseconds
//! instead of a tick.

use crate::error::CoreError;
use std::collections::VecDeque;

/// Ordered `(timestamp, state)` ring, bounded by `window_ms`.
///
/// Invariants: timestamps are strictly increasing front-to-back; entries
/// older than `latest().timestamp - window_ms` are evicted on `record`.
#[derive(Debug, Clone)]
pub struct TimestampedBuffer<S> {
    entries: VecDeque<(u64, S)>,
    window_ms: u64,
}

impl<S> TimestampedBuffer<S> {
    /// `window_ms` should cover the worst-case client round-trip so that a
    /// `LagCompensationRequest` for any action a connected client could
    /// plausibly still be sending is not rejected as out-of-window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<(u64, &S)> {
        self.entries.back().map(|(ts, s)| (*ts, s))
    }

    /// Append a snapshot at `ts`. `ts` must be strictly after the current
    /// latest timestamp, otherwise [`CoreError::NonMonotonicTimestamp`].
    /// Entries that fall outside the rolling window are evicted afterward.
    pub fn record(&mut self, ts: u64, state: S) -> Result<(), CoreError> {
        if let Some((latest_ts, _)) = self.latest() {
            if ts <= latest_ts {
                return Err(CoreError::NonMonotonicTimestamp(ts));
            }
        }
        self.entries.push_back((ts, state));
        self.evict_before(ts.saturating_sub(self.window_ms));
        Ok(())
    }

    fn evict_before(&mut self, cutoff_ts: u64) {
        // self.entries[partition] is the first entry with timestamp >= cutoff_ts
        let partition = self
            .entries
            .partition_point(|(entry_ts, _)| *entry_ts < cutoff_ts);
        self.entries.drain(0..partition);
    }

    /// Entries with `timestamp >= from_ts`, oldest first. Empty if the
    /// buffer holds nothing at or after `from_ts` — in particular, empty if
    /// `from_ts` precedes the retained window, which the caller must treat
    /// as "too old to compensate".
    pub fn slice(&self, from_ts: u64) -> impl Iterator<Item = (u64, &S)> {
        let partition = self
            .entries
            .partition_point(|(entry_ts, _)| *entry_ts < from_ts);
        self.entries
            .iter()
            .skip(partition)
            .map(|(ts, s)| (*ts, s))
    }

    /// Replace the state at exactly `ts`. [`CoreError::NoSuchTimestamp`] if
    /// no entry has that timestamp.
    pub fn rewrite(&mut self, ts: u64, state: S) -> Result<(), CoreError> {
        let idx = self
            .entries
            .iter()
            .position(|(entry_ts, _)| *entry_ts == ts)
            .ok_or(CoreError::NoSuchTimestamp(ts))?;
        self.entries[idx].1 = state;
        Ok(())
    }
}
