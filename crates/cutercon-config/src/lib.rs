//! Configuration for the Cutercon RCON client.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. The RCON password is deliberately not part of [`Config`]:
//! it only ever comes from the command line or the environment.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, ServerConfig};
pub use error::ConfigError;
