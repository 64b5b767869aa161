//! Authentication: JWT verification middleware and the caller extractor.
//!
//! Token issuance lives in the external identity service; this side only
//! verifies HS256 tokens and threads the resulting [`wayfarer_core::models::Caller`]
//! through request extensions.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use middleware::{auth_middleware, AuthState};
pub use models::CallerContext;
