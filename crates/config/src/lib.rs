//! Configuration loading for the credgate gateway.
//!
//! Uses figment to layer built-in defaults, an optional YAML file and
//! `CREDGATE_*` environment variables.

pub mod schema;

pub use schema::{
    Config, ConfigError, FacebookConfig, LogConfig, LogFormat, StoreConfig, TwitterConfig,
};
