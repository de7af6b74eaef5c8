//! Configuration for the Marauder agent: the layered connection settings
//! loader, the config/pointer file locations, and shared tuning constants.

pub mod constants;
pub mod env;
pub mod error;
pub mod loader;

pub use env::{load_dotenv, overrides_from_env};
pub use error::ConfigError;
pub use loader::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};
pub use loader::{ConfigManager, ConfigPaths, MarauderConfig, PartialConfig};
