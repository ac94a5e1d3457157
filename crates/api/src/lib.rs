//! Erasmus+ mobility admin API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! activity recording, exports) so integration tests and the binary
//! entrypoint share them.

pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod exports;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
