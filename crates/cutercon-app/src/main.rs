//! The binary entry point for the `cutercon` RCON client.

use std::process::ExitCode;

use clap::Parser;
use cutercon_app::{load_config, log_settings, run};
use cutercon_config::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Logging is not up yet, so startup failures go straight to stderr.
    let (config, dirs) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("cutercon: {e}");
            return ExitCode::FAILURE;
        }
    };

    let logging =
        cutercon_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Err(e) = logging {
        eprintln!("cutercon: failed to initialize logging: {e}");
    }
    log_settings(&config, &dirs);

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
