//! Client-side tunables, assembled the way `ServerSyncConfig` is.

#[derive(Debug, Clone)]
pub struct ClientSyncConfig {
    /// Fixed tick rate this client's own `IntervalRunner` should use.
    /// Independent of the server's tick rate.
    pub tick_hz: f64,
    /// The server's snapshot rate, used to compute the interpolation render
    /// timestamp (`now - 1000 / server_update_rate_hz`).
    pub server_update_rate_hz: f64,
}

impl Default for ClientSyncConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            server_update_rate_hz: 20.0,
        }
    }
}

impl ClientSyncConfig {
    pub fn with_tick_hz(mut self, tick_hz: f64) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    pub fn with_server_update_rate_hz(mut self, server_update_rate_hz: f64) -> Self {
        self.server_update_rate_hz = server_update_rate_hz;
        self
    }
}
