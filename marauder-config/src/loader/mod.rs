pub mod layers;

mod config;
mod manager;
mod paths;

#[cfg(test)]
mod tests;

pub use config::{MarauderConfig, PartialConfig};
pub use manager::ConfigManager;
pub use paths::ConfigPaths;
