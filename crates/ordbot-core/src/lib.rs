//! ordbot-core: shared error and configuration types for ordbot
//!
//! Every other crate in the workspace builds on the `Error`/`Result` pair
//! and the environment loader defined here.

pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::{get_config, get_config_opt, load_environment};
    pub use super::error::{Error, Result};
}
