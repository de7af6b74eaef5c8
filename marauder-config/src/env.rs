use std::path::PathBuf;

use crate::constants::env_vars;
use crate::error::ConfigError;
use crate::loader::PartialConfig;

/// Load a `.env` file from the current directory or its parents, if any.
///
/// Runs before logging is installed (the file may set `RUST_LOG`), so the
/// outcome is returned for the caller to report: the loaded path, or `None`
/// when there is no file.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Dotenv(source)),
    }
}

/// Read the `MARAUDER_*` overrides from the process environment.
pub fn overrides_from_env() -> Result<PartialConfig, ConfigError> {
    overrides_from_lookup(|name| std::env::var(name).ok())
}

/// Build the environment layer from an arbitrary variable lookup.
/// Blank values count as unset.
pub fn overrides_from_lookup<F>(lookup: F) -> Result<PartialConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };

    let context_limit = match read(env_vars::CONTEXT_LIMIT) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
            var: env_vars::CONTEXT_LIMIT,
            value: raw.clone(),
        })?),
        None => None,
    };

    Ok(PartialConfig {
        base_url: read(env_vars::BASE_URL),
        api_key: read(env_vars::API_KEY),
        model: read(env_vars::MODEL),
        context_limit,
    })
}
