//! trendguard — distribution-day and trend-following market analyzer.
//!
//! Hexagonal architecture: analytics in [`domain`], collaborator traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
