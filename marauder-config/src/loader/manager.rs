use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};
use super::{ConfigPaths, MarauderConfig, PartialConfig};
use crate::env::overrides_from_env;
use crate::error::ConfigError;

/// Loads, layers and persists the connection settings.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    paths: ConfigPaths,
    config_file: PathBuf,
    saved: Option<MarauderConfig>,
    layer_stack: ConfigLayerStack,
}

impl ConfigManager {
    /// Defaults, then the config file, then the process environment, then
    /// `runtime` (command-line flags).
    pub fn load(paths: ConfigPaths, runtime: PartialConfig) -> Result<Self, ConfigError> {
        let environment = overrides_from_env()?;
        Self::load_with(paths, environment, runtime)
    }

    /// Same as [`ConfigManager::load`] with an explicit environment layer.
    pub fn load_with(
        paths: ConfigPaths,
        environment: PartialConfig,
        runtime: PartialConfig,
    ) -> Result<Self, ConfigError> {
        let config_file = paths.config_file();
        let saved = read_config_file(&config_file)?;

        let mut layer_stack = ConfigLayerStack::default();
        layer_stack.push(ConfigLayerEntry::new(
            ConfigLayerSource::Defaults,
            PartialConfig::defaults(),
        ));
        if let Some(saved) = &saved {
            layer_stack.push(ConfigLayerEntry::new(
                ConfigLayerSource::File {
                    file: config_file.clone(),
                },
                PartialConfig::from(saved.clone()),
            ));
        }
        if !environment.is_empty() {
            layer_stack.push(ConfigLayerEntry::new(
                ConfigLayerSource::Environment,
                environment,
            ));
        }
        if !runtime.is_empty() {
            layer_stack.push(ConfigLayerEntry::new(ConfigLayerSource::Runtime, runtime));
        }

        debug!(
            file = %config_file.display(),
            layers = layer_stack.layers().len(),
            "loaded configuration layers"
        );

        Ok(Self {
            paths,
            config_file,
            saved,
            layer_stack,
        })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// The config file's contents, if one was found.
    pub fn saved(&self) -> Option<&MarauderConfig> {
        self.saved.as_ref()
    }

    pub fn layer_stack(&self) -> &ConfigLayerStack {
        &self.layer_stack
    }

    pub fn effective(&self) -> PartialConfig {
        self.layer_stack.effective()
    }

    pub fn resolve(&self) -> Result<MarauderConfig, ConfigError> {
        self.effective().resolve()
    }

    /// Persist `config`. With a `location`, that path becomes the config
    /// file and is recorded in the pointer file.
    pub fn save(
        &mut self,
        config: &MarauderConfig,
        location: Option<&Path>,
    ) -> Result<PathBuf, ConfigError> {
        if let Some(location) = location {
            self.paths.remember_config_file(location)?;
            self.config_file = location.to_path_buf();
        }

        write_config_file(&self.config_file, config)?;
        self.saved = Some(config.clone());
        info!(file = %self.config_file.display(), "saved configuration");
        Ok(self.config_file.clone())
    }
}

fn read_config_file(path: &Path) -> Result<Option<MarauderConfig>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_config_file(path: &Path, config: &MarauderConfig) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let body = serde_json::to_string_pretty(config).map_err(|err| write_error(err.into()))?;
    fs::write(path, body).map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }

    Ok(())
}
