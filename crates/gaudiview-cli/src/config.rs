//! Layered configuration for the command-line tool.
//!
//! Values are resolved as built-in defaults < config file < `-S KEY=VALUE` overrides <
//! explicit command-line flags.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{AppConfig, ConfigOverrides};
