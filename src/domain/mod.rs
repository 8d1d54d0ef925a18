//! Core domain types and logic.

pub mod trade;
pub mod dates;
pub mod numbers;
pub mod normalizer;
pub mod store;
pub mod metrics;
pub mod display;
pub mod config_validation;
pub mod error;
