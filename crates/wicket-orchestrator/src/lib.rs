//! The Wicket access decision orchestrator.
//!
//! This crate is the heart of Wicket. For every inbound device event it:
//! 1. Parses and validates the event into an `AccessAttempt`
//! 2. Short-circuits to a deny when no credential was presented
//! 3. Waits (bounded) for the capture artifact to become available
//! 4. Invokes the biometric matcher
//! 5. Computes the grant/deny decision
//! 6. Submits the decision through the single-writer ledger recorder
//! 7. Publishes the outcome to the device's response topic
//!
//! Each event runs in its own task; attempts never block one another
//! except at the recorder's submission queue. Every well-formed event
//! yields exactly one ledger entry and exactly one device response.

pub mod attempt;
pub mod config;
pub mod decision;
pub mod error;
pub mod orchestrator;
pub mod parser;

pub use attempt::{AttemptReport, AttemptState};
pub use config::OrchestratorConfig;
pub use decision::decide;
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, OrchestratorHandle};
pub use parser::parse_event;
