//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_storage_adapter;
pub mod memory_storage_adapter;
