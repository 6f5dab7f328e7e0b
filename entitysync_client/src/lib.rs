//! Client-side half of the entity synchronization core: prediction,
//! reconciliation against authoritative snapshots, and interpolation
//! (or dead reckoning) for remotely-owned entities.

pub mod config;
pub mod error;
pub mod input_collection;
pub mod new_entity_handler;
pub mod sync;

pub mod prelude {
    pub use crate::config::ClientSyncConfig;
    pub use crate::error::ClientError;
    pub use crate::input_collection::InputCollectionStrategy;
    pub use crate::new_entity_handler::{CheckedNewEntityHandler, NewEntityHandler};
    pub use crate::sync::ClientEntitySynchronizer;
}
