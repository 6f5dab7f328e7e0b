//! Server-side tunables: a small `Default`-deriving struct of knobs,
//! composed by value and adjusted with `with_*` builders.

#[derive(Debug, Clone)]
pub struct ServerSyncConfig {
    /// Fixed tick rate the server's `IntervalRunner` should be started at.
    pub tick_hz: f64,
    /// Rolling window, per entity, that the lag-compensation history keeps.
    /// Should cover the worst-case client round-trip.
    pub history_window_ms: u64,
}

impl Default for ServerSyncConfig {
    fn default() -> Self {
        Self {
            tick_hz: 20.0,
            history_window_ms: 1000,
        }
    }
}

impl ServerSyncConfig {
    pub fn with_tick_hz(mut self, tick_hz: f64) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    pub fn with_history_window_ms(mut self, history_window_ms: u64) -> Self {
        self.history_window_ms = history_window_ms;
        self
    }
}
