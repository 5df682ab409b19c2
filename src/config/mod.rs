//! Configuration for the card engine
//!
//! Provides types and parsing for `statcard.toml`.

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, ConfigError};
pub use schema::*;
