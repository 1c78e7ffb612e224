use thiserror::Error;

/// Errors produced by bus operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus is closed")]
    Closed,
}
