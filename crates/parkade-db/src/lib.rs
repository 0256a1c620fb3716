//! Parkade Database: SurrealDB store and repository implementations.
//!
//! This crate provides:
//! - Connection management and the single-writer gate ([`Store`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations of the `parkade-core` traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, Store};
pub use error::DbError;
pub use schema::run_migrations;
