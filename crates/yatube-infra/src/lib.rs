//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//!
//! Without `postgres` only the in-memory store is available.

pub mod auth;
pub mod database;

pub use auth::{Argon2Hasher, JwtConfig, JwtSessionTokens};
pub use database::{DatabaseConfig, DatabaseConnections, InMemoryStore};
