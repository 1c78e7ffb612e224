use async_trait::async_trait;

use crate::error::LedgerError;
use crate::records::{LogEntry, SignedSubmission};
use crate::signer::LedgerIdentity;

/// Write boundary of the decision ledger.
///
/// Implementations are external collaborators (a chain contract, a remote
/// log service, or [`crate::InMemoryLedger`] for tests). `append` is the
/// only mutation: entries are never updated or deleted.
#[async_trait]
pub trait LedgerAppend: Send + Sync {
    /// Append a signed decision, returning the sequence-assigned entry.
    ///
    /// Rejection (bad signature, unauthorized identity, malformed record)
    /// is terminal: the ledger never partially applies a submission.
    async fn append(&self, submission: &SignedSubmission) -> Result<LogEntry, LedgerError>;
}

/// Read boundary of the decision ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// All entries in append order.
    async fn read_all(&self) -> Result<Vec<LogEntry>, LedgerError>;

    /// Sequence number of the newest entry (0 when empty).
    async fn head_seq(&self) -> Result<u64, LedgerError>;

    /// The single identity authorized to append.
    fn authorized_identity(&self) -> LedgerIdentity;
}
