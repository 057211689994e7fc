//! Port traits decoupling the domain from concrete collaborators.

pub mod config_port;
pub mod data_port;
pub mod model_port;
