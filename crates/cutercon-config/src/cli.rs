//! Command-line argument parsing for the `cutercon` client.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Cutercon command-line arguments.
///
/// CLI values override settings loaded from `cutercon.ron`.
#[derive(Parser, Debug)]
#[command(name = "cutercon", version, about = "Remote console client for RCON game servers")]
pub struct CliArgs {
    /// Server address.
    #[arg(long)]
    pub server: Option<String>,

    /// Server RCON port.
    #[arg(long)]
    pub port: Option<u16>,

    /// RCON password.
    #[arg(long, env = "CUTERCON_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connect timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Commands to run, one per argument. Read from stdin when omitted.
    pub commands: Vec<String>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref addr) = args.server {
            self.server.address = addr.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(timeout) = args.timeout {
            self.server.connect_timeout_seconds = timeout;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
