//! Kasus Service Module
//!
//! Case management for spatial-plan compliance assessments: intake of assessment requests,
//! case initiation, field surveys, team-signed assessments and minutes, verification and the
//! edit-request loop that reopens finalized assessments. Every operation is gated by a
//! role and team-membership policy.

// Public exports
pub mod contract;
pub use contract::{Actor, KasusError, Role};

pub mod module;
pub use module::KasusServiceModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
