//! Data models
//!
//! Shared between the server and web clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! money-carrying models are mapped from cent columns by the server.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY) except identity accounts.

pub mod audit;
pub mod cash_register;
pub mod configuration;
pub mod employee;
pub mod merchant;
pub mod payment;
pub mod report;
pub mod user;

// Re-exports
pub use audit::*;
pub use cash_register::*;
pub use configuration::*;
pub use employee::*;
pub use merchant::*;
pub use payment::*;
pub use report::*;
pub use user::*;
