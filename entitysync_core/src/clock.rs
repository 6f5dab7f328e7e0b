//! Injectable wall-clock abstraction.
//!
//! Every timestamp used by this core (`record`, `StateMessage.timestampMs`,
//! interpolation's render timestamp, ...) is wall-clock-relative, but tests
//! need determinism: real time must never leak into an assertion. Endpoints
//! and the in-memory transport all take a `Clock` rather than calling
//! `Instant::now()` directly, making "now" an injectable resource rather than a global.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now", in milliseconds, shared by an endpoint and whatever
/// transport it talks through.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall-clock implementation, milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealClock;

impl Clock for RealClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_millis() as u64
    }
}

/// A clock that only advances when told to. Shared (by `Arc`) between a
/// virtual transport and both endpoints in a test so that `lagMs`,
/// `windowMs`, and render timestamps behave deterministically.
#[cfg(feature = "test_utils")]
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_ms: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "test_utils")]
impl VirtualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: std::sync::atomic::AtomicU64::new(start_ms),
        }
    }

    /// Advance the clock by `delta_ms` and return the new time.
    pub fn advance(&self, delta_ms: u64) -> u64 {
        self.now_ms
            .fetch_add(delta_ms, std::sync::atomic::Ordering::SeqCst)
            + delta_ms
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(feature = "test_utils")]
impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "test_utils")]
impl Clock for std::sync::Arc<VirtualClock> {
    fn now_ms(&self) -> u64 {
        self.as_ref().now_ms()
    }
}
