use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::records::{LogEntry, SignedSubmission};
use crate::signer::{LedgerIdentity, VerifyingKey};
use crate::traits::{LedgerAppend, LedgerReader};

/// In-memory decision ledger for tests, demos, and embedding.
///
/// Enforces the same contract as a remote ledger: appends must be signed
/// by the single authorized identity, sequence numbers are gapless and
/// strictly increasing, and every entry's receipt chains on its
/// predecessor.
pub struct InMemoryLedger {
    authorized: LedgerIdentity,
    inner: RwLock<Vec<LogEntry>>,
}

impl InMemoryLedger {
    /// Create a ledger that authorizes appends from the given key.
    pub fn new(authorized_key: &VerifyingKey) -> Self {
        Self {
            authorized: authorized_key.identity(),
            inner: RwLock::new(Vec::new()),
        }
    }

    /// Validate receipt chain and sequence monotonicity over all entries.
    pub fn validate_stream(&self) -> Result<(), LedgerError> {
        let entries = self
            .inner
            .read()
            .map_err(|_| LedgerError::Rejected("ledger read lock poisoned".into()))?;

        for (index, entry) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if entry.seq != expected_seq {
                return Err(LedgerError::IntegrityViolation {
                    seq: entry.seq,
                    reason: format!("expected seq {expected_seq}, found {}", entry.seq),
                });
            }

            let expected_prev = if index == 0 {
                None
            } else {
                Some(entries[index - 1].receipt)
            };
            if entry.prev_receipt != expected_prev {
                return Err(LedgerError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "previous receipt link mismatch".into(),
                });
            }

            if !entry.verify_receipt() {
                return Err(LedgerError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "receipt hash mismatch".into(),
                });
            }

            if entry.writer != self.authorized {
                return Err(LedgerError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "entry attributed to unauthorized writer".into(),
                });
            }
        }

        Ok(())
    }

    /// Number of entries currently in the ledger.
    pub fn len(&self) -> usize {
        self.inner.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns `true` if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerAppend for InMemoryLedger {
    async fn append(&self, submission: &SignedSubmission) -> Result<LogEntry, LedgerError> {
        let identity = submission.verify()?;
        if identity != self.authorized {
            return Err(LedgerError::Unauthorized {
                identity: identity.short_id(),
            });
        }

        let mut entries = self
            .inner
            .write()
            .map_err(|_| LedgerError::Rejected("ledger write lock poisoned".into()))?;

        let seq = (entries.len() + 1) as u64;
        let prev_receipt = entries.last().map(|e| e.receipt);
        let receipt = LogEntry::compute_receipt(
            seq,
            &submission.record,
            &identity,
            prev_receipt.as_ref(),
        )?;

        let entry = LogEntry {
            seq,
            record: submission.record.clone(),
            writer: identity,
            prev_receipt,
            receipt,
        };
        entries.push(entry.clone());

        tracing::debug!(seq, receipt = %entry.receipt, "entry appended");
        Ok(entry)
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn read_all(&self) -> Result<Vec<LogEntry>, LedgerError> {
        self.inner
            .read()
            .map(|entries| entries.clone())
            .map_err(|_| LedgerError::Rejected("ledger read lock poisoned".into()))
    }

    async fn head_seq(&self) -> Result<u64, LedgerError> {
        Ok(self.len() as u64)
    }

    fn authorized_identity(&self) -> LedgerIdentity {
        self.authorized.clone()
    }
}
