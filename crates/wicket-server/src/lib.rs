//! Admin HTTP API for Wicket.
//!
//! Read-only access to the decision ledger (newest first) plus an
//! identity-gated enrollment endpoint for reference biometrics. The
//! decision pipeline itself never goes through HTTP; this surface exists
//! for operators and dashboards.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::AdminServer;
pub use state::AppState;
