//! tradezilla: trade journal core.
//!
//! Hexagonal architecture: CSV normalization, the trade store and metrics in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`]. [`journal`] executes user commands against the store.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod journal;
pub mod cli;
