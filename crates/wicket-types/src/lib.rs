//! Foundation types for Wicket, the access decision orchestrator.
//!
//! This crate provides the core identity and data-model types used
//! throughout the Wicket system. Every other Wicket crate depends on
//! `wicket-types`.
//!
//! # Key Types
//!
//! - [`DeviceId`] — Validated identifier of an edge device
//! - [`ArtifactRef`] — Opaque reference to captured probe material
//! - [`SubjectId`] — Matched subject or one of the deny sentinels
//! - [`AttemptId`] — UUID v7 identifier of one access attempt
//! - [`AccessAttempt`] — Normalized inbound device event
//! - [`VerificationResult`] — Outcome of a biometric verification

pub mod attempt;
pub mod device;
pub mod error;
pub mod subject;
pub mod verification;

pub use attempt::{AccessAttempt, AttemptId};
pub use device::{ArtifactRef, DeviceId};
pub use error::TypeError;
pub use subject::SubjectId;
pub use verification::{VerificationResult, MATCH_THRESHOLD};
