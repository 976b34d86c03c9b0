//! REST API layer

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod routes;

pub use auth::{AuthState, Claims};
pub use error::Problem;
pub use routes::{router, ApiDoc};
