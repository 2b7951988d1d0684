//! Chirpy API server library.
//!
//! Exposes the session subsystem and the HTTP building blocks (config, state,
//! error handling, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
