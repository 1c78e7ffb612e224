use thiserror::Error;

use wicket_ledger::LedgerError;

/// Errors produced while orchestrating an access attempt.
///
/// Only `MalformedEvent` aborts before a decision is reached; artifact
/// timeouts and matcher failures degrade into deny decisions inside
/// `wicket-verify` and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("malformed device event: {0}")]
    MalformedEvent(String),

    #[error("ledger submission failed: {0}")]
    Ledger(#[from] LedgerError),
}
