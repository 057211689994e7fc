//! Concrete adapters behind the port traits.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_store_adapter;
pub mod regression_tree;
