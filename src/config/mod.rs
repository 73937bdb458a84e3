// ABOUTME: Configuration types and parsing for bosun.yml.
// ABOUTME: Handles YAML parsing, file discovery and defaults for every section.

mod agent;
mod cpi;
mod env_value;
mod init;

pub use agent::AgentConfig;
pub use cpi::CpiConfig;
pub use env_value::EnvValue;
pub use init::init_config;

use crate::deploy::UpdatePolicy;
use crate::error::{Error, Result};
use crate::types::{InstanceName, JobName};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "bosun.yml";
pub const CONFIG_FILENAME_ALT: &str = "bosun.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".bosun/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// Where the state document lives. Relative paths are resolved against
    /// the directory holding the config file.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub instance: InstanceConfig,

    pub cpi: CpiConfig,

    pub agent: AgentConfig,

    #[serde(default)]
    pub update: UpdatePolicy,
}

fn default_deployment() -> String {
    "bosun".to_string()
}

/// Identity used in stage labels only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub job: JobName,
    #[serde(default)]
    pub index: u32,
}

impl InstanceConfig {
    pub fn name(&self) -> InstanceName {
        InstanceName::new(self.job.clone(), self.index)
    }
}

/// A parsed config plus the directory it was found in.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub dir: PathBuf,
}

impl LoadedConfig {
    /// Absolute or config-relative path of the state document,
    /// `<deployment>-state.json` when not configured.
    pub fn state_path(&self) -> PathBuf {
        match &self.config.state_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.dir.join(path),
            None => self
                .dir
                .join(format!("{}-state.json", self.config.deployment)),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<LoadedConfig> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        // `.bosun/config.yml` keeps state next to the project, not inside `.bosun`.
        let dir = if dir.ends_with(".bosun") {
            dir.parent().map(Path::to_path_buf).unwrap_or(dir)
        } else {
            dir
        };
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(LoadedConfig { config, dir })
    }

    pub fn discover(dir: &Path) -> Result<LoadedConfig> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.deployment.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "deployment name cannot be empty".to_string(),
            ));
        }
        if self.cpi.command.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("cpi.command cannot be empty".to_string()));
        }
        if self.agent.ping_delay.is_zero() {
            return Err(Error::InvalidConfig(
                "agent.ping_delay must be greater than zero".to_string(),
            ));
        }
        if self.update.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "update.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
