use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::paths;
use crate::error::ConfigError;

/// Locations of the config file, the pointer file and the log directory,
/// all anchored at one home directory.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    home: PathBuf,
}

impl ConfigPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn from_home_dir() -> Result<Self, ConfigError> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or(ConfigError::HomeDirUnavailable)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.home.join(paths::DEFAULT_CONFIG_FILE_NAME)
    }

    pub fn pointer_file(&self) -> PathBuf {
        self.home.join(paths::POINTER_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join(paths::LOG_DIR)
    }

    /// The config file in effect: the pointer file's target when it names a
    /// path whose parent directory exists, the default location otherwise.
    pub fn config_file(&self) -> PathBuf {
        let pointer = self.pointer_file();
        if let Ok(raw) = fs::read_to_string(&pointer) {
            let target = PathBuf::from(raw.trim());
            if !target.as_os_str().is_empty()
                && target.parent().is_some_and(Path::is_dir)
            {
                return target;
            }
            debug!(pointer = %pointer.display(), "ignoring stale config pointer");
        }
        self.default_config_file()
    }

    /// Record `file` as the config location for future runs.
    pub fn remember_config_file(&self, file: &Path) -> Result<(), ConfigError> {
        let pointer = self.pointer_file();
        fs::write(&pointer, file.to_string_lossy().as_bytes())
            .map_err(|source| ConfigError::Write { path: pointer, source })
    }

    /// Turn a user-entered save location into a config file path: `~` is
    /// expanded, relative paths are taken from `cwd`, and a directory gets
    /// the default file name appended.
    pub fn save_location(&self, input: &str, cwd: &Path) -> PathBuf {
        let input = input.trim();
        let expanded = if input == "~" {
            self.home.clone()
        } else if let Some(rest) = input.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            PathBuf::from(input)
        };

        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            cwd.join(expanded)
        };

        if absolute.is_dir() {
            absolute.join(paths::CONFIG_FILE_NAME_IN_DIR)
        } else {
            absolute
        }
    }
}
