//! Identity and access
//!
//! - [`JwtService`] issues session and API tokens
//! - [`Principal`] is the normalized identity every handler receives
//! - [`require_session`], [`require_staff`], [`require_api_client`] gate routes

pub mod jwt;
pub mod middleware;
pub mod principal;
pub mod session;

pub use jwt::{JwtConfig, JwtService};
pub use middleware::{require_api_client, require_session, require_staff};
pub use principal::{CASHIER_NOT_LINKED, Principal};
