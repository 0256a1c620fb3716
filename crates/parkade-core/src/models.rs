//! Domain models for Parkade.

pub mod address;
pub mod lot;
pub mod report;
pub mod reservation;
pub mod user;
pub mod vehicle;
