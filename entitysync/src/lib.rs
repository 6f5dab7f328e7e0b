//! Umbrella crate aggregating the entity synchronization workspace:
//! [`entitysync_core`] (data model, history, interpolation),
//! [`entitysync_transport`] (the in-memory testing transport), and,
//! behind their respective feature flags, [`entitysync_server`] and
//! [`entitysync_client`].
//!
//! Most consumers should `use entitysync::prelude::*;`.

pub use entitysync_core as core;
pub use entitysync_transport as transport;

#[cfg(feature = "server")]
pub use entitysync_server as server;

#[cfg(feature = "client")]
pub use entitysync_client as client;

pub mod prelude {
    pub use entitysync_core::prelude::*;
    pub use entitysync_transport::prelude::*;

    #[cfg(feature = "server")]
    pub use entitysync_server::prelude::*;

    #[cfg(feature = "client")]
    pub use entitysync_client::prelude::*;
}
