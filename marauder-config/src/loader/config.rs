use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::ConfigError;

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarauderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_context_limit")]
    pub context_limit: u64,
}

fn default_context_limit() -> u64 {
    defaults::DEFAULT_CONTEXT_LIMIT
}

impl fmt::Debug for MarauderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarauderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(Some(&self.api_key)))
            .field("model", &self.model)
            .field("context_limit", &self.context_limit)
            .finish()
    }
}

/// One configuration layer. Unset fields defer to lower layers.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_limit: Option<u64>,
}

impl fmt::Debug for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(self.api_key.as_deref()))
            .field("model", &self.model)
            .field("context_limit", &self.context_limit)
            .finish()
    }
}

impl PartialConfig {
    /// Values every run starts from.
    pub fn defaults() -> Self {
        Self {
            base_url: Some(defaults::DEFAULT_BASE_URL.to_owned()),
            api_key: None,
            model: None,
            context_limit: Some(defaults::DEFAULT_CONTEXT_LIMIT),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.api_key.is_none()
            && self.model.is_none()
            && self.context_limit.is_none()
    }

    /// Overlay `higher` on top of `self`. Blank strings in `higher` do not
    /// override.
    pub fn merge_from(&mut self, higher: &PartialConfig) {
        overlay(&mut self.base_url, &higher.base_url);
        overlay(&mut self.api_key, &higher.api_key);
        overlay(&mut self.model, &higher.model);
        if higher.context_limit.is_some() {
            self.context_limit = higher.context_limit;
        }
    }

    /// Fields still missing before this layer can become a [`MarauderConfig`].
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.base_url) {
            missing.push("base_url");
        }
        if is_blank(&self.api_key) {
            missing.push("api_key");
        }
        if is_blank(&self.model) {
            missing.push("model");
        }
        missing
    }

    pub fn resolve(self) -> Result<MarauderConfig, ConfigError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::Incomplete { missing });
        }

        Ok(MarauderConfig {
            base_url: self.base_url.unwrap_or_default(),
            api_key: self.api_key.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            context_limit: self.context_limit.unwrap_or(defaults::DEFAULT_CONTEXT_LIMIT),
        })
    }
}

impl From<MarauderConfig> for PartialConfig {
    fn from(config: MarauderConfig) -> Self {
        Self {
            base_url: Some(config.base_url),
            api_key: Some(config.api_key),
            model: Some(config.model),
            context_limit: Some(config.context_limit),
        }
    }
}

fn overlay(target: &mut Option<String>, higher: &Option<String>) {
    if let Some(value) = higher
        && !value.trim().is_empty()
    {
        *target = Some(value.clone());
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn redact(key: Option<&str>) -> &'static str {
    match key {
        Some(key) if !key.is_empty() => "<redacted>",
        _ => "<unset>",
    }
}
