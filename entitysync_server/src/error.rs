use entitysync_core::error::CoreError;
use thiserror::Error;

/// Fatal errors raised while running the server's tick loop. `UnknownEntity`
/// is deliberately *not* a variant here: it is logged and the input
/// is dropped, it never interrupts the tick.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    History(#[from] CoreError),
}
