//! Parkade Service: Caller-aware facades over the repository traits.
//!
//! Each service checks the [`Caller`](parkade_core::caller::Caller) it is
//! given before delegating to a repository. The request-handling layer
//! builds the caller from a successful login.

pub mod account;
pub mod booking;
pub mod lot;
pub mod report;

pub use account::AccountService;
pub use booking::BookingService;
pub use lot::LotService;
pub use report::ReportService;
