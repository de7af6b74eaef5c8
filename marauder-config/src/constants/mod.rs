/// Default connection values
pub mod defaults;
/// History trimming, truncation and summary compaction
pub mod compaction;
/// Protocol engine limits
pub mod execution;
/// Terminal presentation
pub mod ui;

/// Environment variable names read by the loader.
pub mod env_vars {
    pub const BASE_URL: &str = "MARAUDER_BASE_URL";
    pub const API_KEY: &str = "MARAUDER_API_KEY";
    pub const MODEL: &str = "MARAUDER_MODEL";
    pub const CONTEXT_LIMIT: &str = "MARAUDER_CONTEXT_LIMIT";
}

/// Well-known file names under the user's home directory.
pub mod paths {
    pub const DEFAULT_CONFIG_FILE_NAME: &str = ".marauder_config.json";
    pub const POINTER_FILE_NAME: &str = ".marauder_config_path";
    /// Appended when the user picks a directory as the save location.
    pub const CONFIG_FILE_NAME_IN_DIR: &str = "marauder_config.json";
    pub const LOG_DIR: &str = ".marauder/logs";
    pub const DEBUG_LOG_FILE_NAME: &str = "marauder-debug.log";
}
