//! Application configuration, one module per concern.
//!
//! Everything is environment-sourced and loaded once at startup into
//! [`crate::state::AppState`]. Required values (database URL, token
//! secrets) abort startup when missing; tunables fall back to defaults.

pub mod cors;
pub mod database;
pub mod jwt;
pub mod security;
