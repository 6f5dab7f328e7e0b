//! Core types shared by the entitysync client, server, and transport crates:
//! the data model, the timestamped history buffer, the default state
//! interpolator, and the ambient collaborator interfaces (clock, interval
//! runner, event emitter) consumed by both endpoints.

pub mod clock;
pub mod entity;
pub mod error;
pub mod events;
pub mod history;
pub mod id;
pub mod interval;
pub mod message;
pub mod state;

pub mod prelude {
    pub use crate::clock::{Clock, RealClock};
    #[cfg(feature = "test_utils")]
    pub use crate::clock::VirtualClock;
    pub use crate::entity::{Entity, EntityCollection, SyncStrategy};
    pub use crate::error::CoreError;
    pub use crate::events::{EventEmitter, SharedEventEmitter};
    pub use crate::history::TimestampedBuffer;
    pub use crate::id::{ClientId, EntityId};
    pub use crate::interval::{Interval, IntervalRunner};
    pub use crate::message::{EntityUpdate, InputMessage, Message, Snapshot, StateMessage};
    pub use crate::state::{linear_interpolate, ApplyInput, Interpolate, Reckon, StateValue};
}
