//! Request extractors shared by the handlers.
//!
//! - [`auth::AuthUser`] -- Authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` or `super-admin` role.
//! - [`context::RequestContext`] -- Client IP and user agent for activity entries.

pub mod auth;
pub mod context;
pub mod rbac;
