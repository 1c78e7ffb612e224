use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wicket_types::{DeviceId, SubjectId};

use crate::error::LedgerError;
use crate::signer::{LedgerIdentity, Signature, SigningKey, VerifyingKey};

/// A fully-decided access outcome, ready for submission to the ledger.
///
/// This is the pre-sequence form of a log entry: everything about the
/// decision is final, but the ledger has not yet assigned a sequence
/// position or receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// The subject the decision is about (or a deny sentinel).
    pub subject: SubjectId,
    /// The device that reported the attempt.
    pub device: DeviceId,
    /// Whether the upstream credential check matched.
    pub credential_matched: bool,
    /// Whether biometric verification matched.
    pub verification_matched: bool,
    /// The final decision: `credential_matched && verification_matched`.
    pub access_granted: bool,
    /// When the decision was reached.
    pub decided_at: DateTime<Utc>,
}

impl DecisionRecord {
    /// Canonical signing bytes for this record.
    ///
    /// Uses bincode under a domain tag so the signature covers exactly the
    /// fields the ledger will store.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        let mut bytes = b"wicket-decision-v1:".to_vec();
        let body =
            bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

/// A decision record signed by a writer identity.
///
/// This is the unit the ledger accepts: the record plus the public key and
/// signature proving who submitted it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedSubmission {
    /// The decision being appended.
    pub record: DecisionRecord,
    /// Raw public key of the submitting writer.
    pub writer_key: [u8; 32],
    /// Signature over [`DecisionRecord::signing_bytes`].
    pub signature: Signature,
}

impl SignedSubmission {
    /// Sign a record with the given key.
    pub fn sign(key: &SigningKey, record: DecisionRecord) -> Result<Self, LedgerError> {
        let signature = key.sign(&record.signing_bytes()?);
        Ok(Self {
            record,
            writer_key: key.verifying_key().as_bytes(),
            signature,
        })
    }

    /// Verify the signature and return the submitting identity.
    pub fn verify(&self) -> Result<LedgerIdentity, LedgerError> {
        let key = VerifyingKey::from_bytes(self.writer_key)?;
        key.verify(&self.record.signing_bytes()?, &self.signature)?;
        Ok(key.identity())
    }
}

/// Receipt confirming an assigned ledger position.
///
/// The receipt is a BLAKE3 hash over the entry's content, its sequence
/// number, and the previous entry's receipt, forming a tamper-evident
/// chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WriteReceipt([u8; 32]);

impl WriteReceipt {
    /// Create from a raw hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 hex chars).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for WriteReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriteReceipt({})", self.short_hex())
    }
}

impl fmt::Display for WriteReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcp:{}", self.short_hex())
    }
}

/// An immutable, sequence-assigned entry in the decision ledger.
///
/// Entries are append-only: once written they are never updated or
/// deleted. `seq` is gapless and strictly increasing per writer identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Ledger-assigned sequence position (1-based, gapless).
    pub seq: u64,
    /// The decision this entry records.
    pub record: DecisionRecord,
    /// Identity of the writer that appended this entry.
    pub writer: LedgerIdentity,
    /// Receipt of the previous entry (`None` for the first entry).
    pub prev_receipt: Option<WriteReceipt>,
    /// This entry's receipt.
    pub receipt: WriteReceipt,
}

impl LogEntry {
    /// Compute the receipt hash for an entry's content.
    pub fn compute_receipt(
        seq: u64,
        record: &DecisionRecord,
        writer: &LedgerIdentity,
        prev_receipt: Option<&WriteReceipt>,
    ) -> Result<WriteReceipt, LedgerError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"wicket-receipt-v1:");
        hasher.update(&seq.to_le_bytes());
        hasher.update(&record.signing_bytes()?);
        hasher.update(writer.as_bytes());
        match prev_receipt {
            Some(prev) => {
                hasher.update(b"prev:");
                hasher.update(prev.as_bytes());
            }
            None => {
                hasher.update(b"genesis");
            }
        }
        Ok(WriteReceipt::from_hash(*hasher.finalize().as_bytes()))
    }

    /// Recompute this entry's receipt and compare against the stored one.
    pub fn verify_receipt(&self) -> bool {
        match Self::compute_receipt(self.seq, &self.record, &self.writer, self.prev_receipt.as_ref())
        {
            Ok(expected) => expected == self.receipt,
            Err(_) => false,
        }
    }
}
