//! Append-only decision ledger for Wicket.
//!
//! This crate is the system of record for access decisions. It provides:
//! - Decision record and log entry types with hash-chained receipts
//! - An ed25519 signing identity for the single authorized writer
//! - `LedgerAppend` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` implementation for tests and embedding
//! - `LedgerRecorder`: the single-writer submission queue that serializes
//!   all appends against the signing identity
//!
//! The recorder is the only component allowed to submit writes; its queue
//! is the one shared-mutable-resource boundary in the system.

pub mod error;
pub mod memory;
pub mod records;
pub mod recorder;
pub mod signer;
pub mod traits;

pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use records::{DecisionRecord, LogEntry, SignedSubmission, WriteReceipt};
pub use recorder::{LedgerRecorder, RecorderHandle};
pub use signer::{LedgerIdentity, Signature, SigningKey, VerifyingKey};
pub use traits::{LedgerAppend, LedgerReader};
