//! Slopeline API Library
//!
//! This crate contains the API server components for Slopeline, a ski and
//! snowboard lesson scheduling service.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
