use std::sync::Arc;

use wicket_ledger::LedgerReader;
use wicket_verify::VerificationClient;

/// Shared state for the admin API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read side of the decision ledger.
    pub ledger: Arc<dyn LedgerReader>,
    /// Verification client, used only for enrollment here.
    pub verifier: VerificationClient,
    /// Whether `/v1/logs` may be read without presenting an identity.
    pub allow_anonymous_read: bool,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerReader>, verifier: VerificationClient) -> Self {
        Self {
            ledger,
            verifier,
            allow_anonymous_read: true,
        }
    }

    /// Require the authorized writer identity for log reads.
    pub fn with_gated_reads(mut self) -> Self {
        self.allow_anonymous_read = false;
        self
    }
}
