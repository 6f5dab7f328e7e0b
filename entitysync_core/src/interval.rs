//! The external interval-running collaborator. The core never blocks
//! or sleeps itself; waiting between ticks is delegated here, and every
//! synchronizer also exposes a pure `tick()` so tests can drive it without
//! an interval runner at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// A fixed tick interval, usually derived from a rate in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub ms: u64,
}

impl Interval {
    pub fn from_hz(hz: f64) -> Self {
        assert!(hz > 0.0, "tick rate must be positive");
        Self {
            ms: (1000.0 / hz).round() as u64,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.ms)
    }
}

/// `start(rateHz)` / `stop()` / `isRunning()`, backed by a background
/// thread that calls `tick` on a fixed interval. Not part of the core's
/// decision logic — a test harness typically calls `tick()` directly
/// instead of spinning this up.
pub struct IntervalRunner {
    interval: Interval,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalRunner {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the background thread, calling `tick` every `interval`. A
    /// second call while already running is a no-op.
    pub fn start(&mut self, mut tick: impl FnMut() + Send + 'static) {
        if self.is_running() {
            return;
        }
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let period = self.interval.as_duration();
        self.handle = Some(std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                tick();
                std::thread::sleep(period);
            }
        }));
    }

    /// Halt at the next tick boundary; the in-flight tick (if any) runs to
    /// completion. Blocks until the background thread has exited.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IntervalRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn from_hz_computes_millisecond_period() {
        assert_eq!(Interval::from_hz(10.0).ms, 100);
        assert_eq!(Interval::from_hz(60.0).ms, 17);
    }

    #[test]
    fn start_stop_toggle_is_running() {
        let mut runner = IntervalRunner::new(Interval::from_hz(1000.0));
        assert!(!runner.is_running());
        runner.start(|| {});
        assert!(runner.is_running());
        runner.stop();
        assert!(!runner.is_running());
    }
}
