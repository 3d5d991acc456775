//! Telemetry configuration from TOML (`[telemetry]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTelemetryConfig {
    /// Append council events as JSON lines to this file
    pub jsonl_path: Option<PathBuf>,
}
