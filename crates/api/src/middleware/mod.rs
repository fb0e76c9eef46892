//! HTTP middleware.

pub mod auth;

pub use auth::{AuthUser, Capability, auth_middleware};
