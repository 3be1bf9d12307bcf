//! The `cutercon` command-line client.
//!
//! Resolves settings, opens one authenticated RCON session and runs the
//! given commands through it, printing each response to stdout.

pub mod console;
pub mod platform;

use std::time::Duration;

use cutercon_config::{CliArgs, Config, ConfigError};
use cutercon_net::{RconError, RconSession, SessionConfig, SocketConfig};
use tokio::io::BufReader;

use crate::platform::{PlatformDirs, PlatformError};

/// Everything that can end a `cutercon` run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Config or log directories could not be set up.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Neither `--password` nor `CUTERCON_PASSWORD` was given.
    #[error("no RCON password given; pass --password or set CUTERCON_PASSWORD")]
    MissingPassword,

    /// Connecting or logging in failed.
    #[error(transparent)]
    Rcon(#[from] RconError),

    /// A command failed; later commands were not run.
    #[error("command `{command}` failed: {source}")]
    Command {
        /// The command as sent.
        command: String,
        /// Why it failed.
        #[source]
        source: RconError,
    },

    /// Reading commands or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve directories, load `cutercon.ron` and apply command-line overrides.
///
/// `--config` replaces the OS config directory. A missing config file is
/// created with defaults.
pub fn load_config(args: &CliArgs) -> Result<(Config, PlatformDirs), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    Ok((config, dirs))
}

/// Report the loaded settings. Call once logging is up; config loading
/// itself runs before the subscriber exists.
pub fn log_settings(config: &Config, dirs: &PlatformDirs) {
    tracing::info!("Using settings from {}", dirs.config_file().display());
    tracing::debug!(
        server = %config.server.address,
        port = config.server.port,
        timeout_secs = config.server.connect_timeout_seconds,
        log_dir = %dirs.log_dir.display(),
        "Effective settings"
    );
}

/// Session parameters for the configured server.
pub fn session_config(config: &Config, password: &str) -> SessionConfig {
    let server = &config.server;
    let mut session = SessionConfig::new(server.address.clone(), password).with_port(server.port);
    session.connect_timeout = Duration::from_secs(u64::from(server.connect_timeout_seconds));
    session.max_frame_length = server.max_frame_length as usize;
    session.socket = SocketConfig {
        tcp_nodelay: server.tcp_nodelay,
        keepalive_enabled: server.keepalive,
        ..SocketConfig::default()
    };
    session
}

/// Connect, run the commands from `args` (or stdin when there are none)
/// and disconnect.
pub async fn run(args: &CliArgs, config: &Config) -> Result<(), AppError> {
    let password = args.password.as_deref().ok_or(AppError::MissingPassword)?;
    let mut session: RconSession = RconSession::new(session_config(config, password));
    session.connect().await?;

    let mut stdout = tokio::io::stdout();
    let result = if args.commands.is_empty() {
        tracing::debug!("Reading commands from stdin");
        let stdin = BufReader::new(tokio::io::stdin());
        console::run_lines(&mut session, stdin, &mut stdout).await
    } else {
        console::run_commands(&mut session, &args.commands, &mut stdout).await
    };

    session.disconnect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_session_config_from_settings() {
        let mut config = Config::default();
        config.server.address = "game.example".to_string();
        config.server.port = 27015;
        config.server.connect_timeout_seconds = 3;
        config.server.max_frame_length = 8192;
        config.server.keepalive = false;

        let session = session_config(&config, "hunter2");

        assert_eq!(session.address(), "game.example:27015");
        assert_eq!(session.password, "hunter2");
        assert_eq!(session.connect_timeout, Duration::from_secs(3));
        assert_eq!(session.max_frame_length, 8192);
        assert!(session.socket.tcp_nodelay);
        assert!(!session.socket.keepalive_enabled);
    }

    #[test]
    fn test_load_config_uses_given_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("conf");
        let args = CliArgs::parse_from([
            "cutercon",
            "--config",
            dir.to_str().unwrap(),
            "--port",
            "27015",
        ]);

        let (config, dirs) = load_config(&args).unwrap();

        assert_eq!(dirs.config_dir, dir);
        assert!(dir.join(cutercon_config::CONFIG_FILE_NAME).exists());
        assert!(dirs.log_dir.exists());
        assert_eq!(config.server.port, 27015);
        log_settings(&config, &dirs);
    }

    #[test]
    fn test_overrides_are_not_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();

        let args = CliArgs::parse_from(["cutercon", "--config", dir, "--server", "10.1.1.1"]);
        load_config(&args).unwrap();
        let args = CliArgs::parse_from(["cutercon", "--config", dir]);
        let (config, _) = load_config(&args).unwrap();

        assert_eq!(config.server.address, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_run_requires_password() {
        let args = CliArgs::parse_from(["cutercon", "list"]);
        let err = run(&args, &Config::default()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingPassword));
    }
}
