//! Parkade Core: Domain models, error types, repository traits and the
//! billing rule shared by every Parkade crate.

pub mod billing;
pub mod caller;
pub mod error;
pub mod models;
pub mod repository;
