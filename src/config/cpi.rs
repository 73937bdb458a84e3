// ABOUTME: Configuration of the external CPI executable.
// ABOUTME: Command, extra arguments, request context and call timeout.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct CpiConfig {
    pub command: PathBuf,

    #[serde(default)]
    pub args: Vec<String>,

    /// Sent verbatim as the `context` of every request.
    #[serde(default)]
    pub context: Map<String, Value>,

    #[serde(default)]
    pub api_version: Option<u32>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

impl CpiConfig {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            context: Map::new(),
            api_version: None,
            timeout: default_timeout(),
        }
    }
}
