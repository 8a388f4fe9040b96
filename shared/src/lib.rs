//! Shared types for the SINPE back office
//!
//! Error system, domain models and validation rules used by the server
//! and its web clients.

pub mod error;
pub mod models;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
