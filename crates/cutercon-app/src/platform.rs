//! Platform directory resolution.
//!
//! The client keeps two things on disk: `cutercon.ron` in the config
//! directory and, in debug builds, a JSON log in the log directory.

use std::path::{Path, PathBuf};

use cutercon_config::CONFIG_FILE_NAME;

/// Failure to locate or create the client directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// No per-user config location is known on this OS.
    #[error("no per-user config directory on this system; pass --config")]
    NoConfigDir,
    /// A directory could not be created.
    #[error("cannot create client directory: {0}")]
    Io(#[from] std::io::Error),
}

/// OS-specific directories used by the client.
///
/// Resolves to the platform-appropriate location following OS conventions
/// (XDG on Linux, Known Folders on Windows, Library on macOS).
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    /// Holds `cutercon.ron`.
    pub config_dir: PathBuf,
    /// Log files.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "cutercon";

impl PlatformDirs {
    /// Per-user directories for this OS. Nothing is created.
    ///
    /// Logs prefer the state directory, then the cache directory, then a
    /// `logs` folder next to the config.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_dir = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let log_dir = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|base| base.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| config_dir.join("logs"));

        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Directories rooted at a user-chosen config directory.
    ///
    /// Used for `--config`; logs go to a `logs` subdirectory.
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    /// Where the settings file lives.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Create both directories, including missing parents.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
