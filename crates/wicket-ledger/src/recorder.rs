use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::records::{DecisionRecord, LogEntry, SignedSubmission};
use crate::signer::SigningKey;
use crate::traits::LedgerAppend;

/// Queue depth of the recorder's submission channel.
const SUBMISSION_QUEUE_CAPACITY: usize = 256;

struct Submission {
    record: DecisionRecord,
    reply: oneshot::Sender<Result<LogEntry, LedgerError>>,
}

/// The single-writer submission queue in front of the signing identity.
///
/// All appends against the ledger go through one writer task that owns the
/// signing key and the ledger handle. Submissions are signed and dispatched
/// strictly one at a time in arrival order; a submission is complete only
/// when its receipt (with the assigned sequence position) comes back.
///
/// This queue is the one shared-mutable-resource boundary in the system:
/// concurrent attempts never race for a sequence slot because only this
/// task ever talks to the ledger's write side.
pub struct LedgerRecorder;

impl LedgerRecorder {
    /// Spawn the writer task, transferring ownership of the signing key.
    ///
    /// Returns a cloneable handle for submitting records. The task exits
    /// when every handle has been dropped.
    pub fn spawn(signer: SigningKey, ledger: Arc<dyn LedgerAppend>) -> RecorderHandle {
        let (tx, rx) = mpsc::channel(SUBMISSION_QUEUE_CAPACITY);
        tokio::spawn(Self::run(signer, ledger, rx));
        RecorderHandle { tx }
    }

    async fn run(
        signer: SigningKey,
        ledger: Arc<dyn LedgerAppend>,
        mut rx: mpsc::Receiver<Submission>,
    ) {
        debug!(identity = %signer.identity(), "recorder started");

        while let Some(submission) = rx.recv().await {
            let result = match SignedSubmission::sign(&signer, submission.record) {
                Ok(signed) => ledger.append(&signed).await,
                Err(e) => Err(e),
            };

            match &result {
                Ok(entry) => debug!(seq = entry.seq, receipt = %entry.receipt, "decision recorded"),
                Err(e) => warn!(error = %e, "ledger submission failed"),
            }

            // The submitter may have been cancelled; the entry (if any) is
            // already committed either way.
            let _ = submission.reply.send(result);
        }

        debug!("recorder stopped");
    }
}

/// Handle for submitting decision records to the [`LedgerRecorder`].
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<Submission>,
}

impl RecorderHandle {
    /// Submit a fully-decided record and wait for its receipt.
    ///
    /// No retries: a rejection from the ledger is terminal for the attempt.
    pub async fn submit(&self, record: DecisionRecord) -> Result<LogEntry, LedgerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Submission {
                record,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LedgerError::RecorderClosed)?;
        reply_rx.await.map_err(|_| LedgerError::RecorderClosed)?
    }
}
