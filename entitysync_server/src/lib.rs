//! Server-side half of the entity synchronization core: the authoritative
//! per-tick loop and bounded-history lag compensation.

pub mod config;
pub mod error;
pub mod lag_compensation;
pub mod sync;

pub mod prelude {
    pub use crate::config::ServerSyncConfig;
    pub use crate::error::ServerError;
    pub use crate::lag_compensation::{
        process_lag_compensation_request, LagCompensationRequest, RequestApplicator,
        RequestValidator, Resimmer,
    };
    pub use crate::sync::ServerEntitySynchronizer;
}
