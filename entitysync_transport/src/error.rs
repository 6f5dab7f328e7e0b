use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TransportError {
    /// `send` was called before `connect`. Test misuse; fatal.
    #[error("send() called on a TwoWayBuffer endpoint before connect()")]
    SendBeforeConnect,
}
