//! Domain types and errors shared by the persistence and HTTP layers.
//!
//! This crate has no internal dependencies so both `chirpy-db` and
//! `chirpy-api` can build on it.

pub mod error;
pub mod types;
