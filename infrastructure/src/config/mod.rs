//! Configuration file loading for signal-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `COUNCIL_*` (`__` separates sections, e.g. `COUNCIL_COUNCIL__MAX_ROUNDS`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/signal-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileCouncilConfig, FileEngineConfig, FileIntentConfig,
    FileTelemetryConfig, FileToolEntry, FileToolsConfig, FileWorkerConfig,
};
pub use loader::ConfigLoader;
