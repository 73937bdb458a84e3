// ABOUTME: Shared, immutable inputs for every CLI command.
// ABOUTME: Built once from the global flags and the discovered configuration.

use bosun::config::{Config, LoadedConfig};
use bosun::connect;
use bosun::deploy::DeploymentManager;
use bosun::error::Result;
use bosun::output::{Output, OutputMode};
use bosun::state::StateStore;
use std::path::Path;
use std::sync::Arc;

pub struct CommandContext {
    loaded: LoadedConfig,
    mode: OutputMode,
}

impl CommandContext {
    /// Load the config from `path`, or discover it in `cwd`.
    pub fn load(path: Option<&Path>, cwd: &Path, mode: OutputMode) -> Result<Self> {
        let loaded = match path {
            Some(path) => Config::load(path)?,
            None => Config::discover(cwd)?,
        };
        Ok(Self { loaded, mode })
    }

    pub fn config(&self) -> &Config {
        &self.loaded.config
    }

    pub fn output(&self) -> Output {
        Output::new(self.mode)
    }

    pub fn state_store(&self) -> Arc<dyn StateStore> {
        connect::state_store(&self.loaded)
    }

    pub fn deployment_manager(&self) -> Result<DeploymentManager> {
        Ok(connect::manager_factory(&self.loaded)?.deployment_manager())
    }
}
