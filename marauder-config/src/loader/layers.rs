use std::path::PathBuf;

use super::PartialConfig;

/// Where a configuration layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Built-in defaults
    Defaults,
    /// The JSON config file
    File { file: PathBuf },
    /// `MARAUDER_*` environment variables
    Environment,
    /// Command-line flags
    Runtime,
}

impl ConfigLayerSource {
    pub fn label(&self) -> String {
        match self {
            Self::Defaults => "defaults".to_owned(),
            Self::File { file } => file.display().to_string(),
            Self::Environment => "environment".to_owned(),
            Self::Runtime => "command line".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayerEntry {
    pub source: ConfigLayerSource,
    pub values: PartialConfig,
}

impl ConfigLayerEntry {
    pub fn new(source: ConfigLayerSource, values: PartialConfig) -> Self {
        Self { source, values }
    }
}

/// Layers ordered from lowest to highest precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayerStack {
    layers: Vec<ConfigLayerEntry>,
}

impl ConfigLayerStack {
    pub fn push(&mut self, layer: ConfigLayerEntry) {
        self.layers.push(layer);
    }

    pub fn effective(&self) -> PartialConfig {
        let mut merged = PartialConfig::default();
        for layer in &self.layers {
            merged.merge_from(&layer.values);
        }
        merged
    }

    pub fn layers(&self) -> &[ConfigLayerEntry] {
        &self.layers
    }

    /// Highest-precedence layer that sets the model.
    pub fn model_source(&self) -> Option<&ConfigLayerSource> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.values.model.is_some())
            .map(|layer| &layer.source)
    }
}
