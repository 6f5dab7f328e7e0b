//! Lag compensation: fold a client's delayed action into the entity
//! history at the timestamp the client perceived it happening, then
//! resimulate every later frame so the history stays internally
//! consistent without disturbing its timestamps.

use entitysync_core::history::TimestampedBuffer;
use entitysync_core::id::EntityId;

/// A delayed client action to be validated against and folded into history.
/// `client_latency_ms` is supplied for validators that want to bound how
/// far back a request is allowed to reach (an anti-cheat concern beyond
/// the timestamp-window check already enforced by `slice`).
#[derive(Debug, Clone)]
pub struct LagCompensationRequest<R> {
    pub entity_id: EntityId,
    pub timestamp_ms: u64,
    pub client_latency_ms: u64,
    pub payload: R,
}

/// `requestValidator(request, {serverHistory, clientLatency})`.
pub trait RequestValidator<S, R> {
    fn validate(&self, request: &LagCompensationRequest<R>, history: &TimestampedBuffer<S>) -> bool;
}

/// `requestApplicator(base, request) -> base'`.
pub trait RequestApplicator<S, R> {
    fn apply(&self, base: &S, request: &LagCompensationRequest<R>) -> S;
}

/// `resimmer({oldPreviousState, newPreviousState, oldCurrentState}) -> state`.
/// Must be pure with respect to its three inputs — no hidden mutation.
pub trait Resimmer<S> {
    fn resim(&self, old_previous: &S, new_previous: &S, old_current: &S) -> S;
}

/// Process one lag-compensation request against `history`. Returns `false`
/// with no side effects if the request is out of window or fails
/// validation; otherwise rewrites `history` in place and returns `true`.
///
/// Invariants preserved: the number of frames is unchanged, timestamps are
/// preserved exactly, and a rejected request leaves `history` untouched.
pub fn process_lag_compensation_request<S, R>(
    history: &mut TimestampedBuffer<S>,
    request: &LagCompensationRequest<R>,
    validator: &dyn RequestValidator<S, R>,
    applicator: &dyn RequestApplicator<S, R>,
    resimmer: &dyn Resimmer<S>,
) -> bool
where
    S: Clone,
{
    let frames: Vec<(u64, S)> = history
        .slice(request.timestamp_ms)
        .map(|(ts, s)| (ts, s.clone()))
        .collect();
    if frames.is_empty() {
        tracing::debug!(entity_id = %request.entity_id, timestamp_ms = request.timestamp_ms, "lag compensation request out of window");
        return false;
    }
    if !validator.validate(request, history) {
        tracing::debug!(entity_id = %request.entity_id, "lag compensation request rejected by validator");
        return false;
    }

    let base_prime = applicator.apply(&frames[0].1, request);
    let mut new_history: Vec<(u64, S)> = Vec::with_capacity(frames.len());
    new_history.push((frames[0].0, base_prime));
    for i in 1..frames.len() {
        let old_previous = &frames[i - 1].1;
        let new_previous = &new_history[i - 1].1;
        let old_current = &frames[i].1;
        new_history.push((frames[i].0, resimmer.resim(old_previous, new_previous, old_current)));
    }

    for (ts, state) in new_history {
        history
            .rewrite(ts, state)
            .expect("rewrite target was just read from slice() on the same history");
    }
    true
}
