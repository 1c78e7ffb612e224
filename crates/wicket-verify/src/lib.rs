//! Biometric verification for Wicket.
//!
//! Adapts the remote matcher capability into [`wicket_types::VerificationResult`]
//! and provides the bounded-poll artifact waiter that bridges the gap
//! between a device reporting a capture and the capture becoming available
//! to the matcher.
//!
//! Remote failures never propagate out of this crate as errors: every
//! failure mode degrades into a non-matching result carrying a sentinel
//! subject, so the orchestrator can always reach a (denying) decision.

pub mod client;
pub mod error;
pub mod matcher;
pub mod waiter;

pub use client::VerificationClient;
pub use error::MatcherError;
pub use matcher::{BiometricMatcher, MatchCandidate};
pub use waiter::{ArtifactStore, ArtifactWaiter, InMemoryArtifactStore, WaitOutcome, WaitPolicy};
