// ABOUTME: Builds the CPI client, agent client and state store from configuration.
// ABOUTME: Unifies their setup failures in one SNAFU error with a kind() accessor.

use snafu::{ResultExt, Snafu};
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{AgentClient, AgentError, HttpAgentClient};
use crate::cloud::{Cloud, ExternalCpi};
use crate::config::LoadedConfig;
use crate::deploy::ManagerFactory;
use crate::state::{FileStateStore, StateStore};

/// Failure to set up a collaborator from config.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConnectError {
    #[snafu(display("agent URL could not be resolved: {source}"))]
    AgentUrl { source: crate::error::Error },

    #[snafu(display("agent client setup failed: {source}"))]
    Agent { source: AgentError },

    #[snafu(display("CPI executable not found: {}", path.display()))]
    CpiMissing { path: PathBuf },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// The agent URL references an unset environment variable.
    MissingCredentials,
    /// The agent URL is malformed or uses an unsupported scheme.
    InvalidAgentUrl,
    /// The configured CPI command does not exist.
    CpiNotFound,
}

impl ConnectError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::AgentUrl { .. } => ConnectErrorKind::MissingCredentials,
            ConnectError::Agent { .. } => ConnectErrorKind::InvalidAgentUrl,
            ConnectError::CpiMissing { .. } => ConnectErrorKind::CpiNotFound,
        }
    }
}

/// CPI client for the configured executable. A bare command name is looked
/// up on PATH when the process is spawned, so only paths are checked here.
pub fn cloud(loaded: &LoadedConfig) -> Result<Arc<dyn Cloud>, ConnectError> {
    let cpi = &loaded.config.cpi;
    let command = if cpi.command.components().count() > 1 && cpi.command.is_relative() {
        loaded.dir.join(&cpi.command)
    } else {
        cpi.command.clone()
    };
    if command.components().count() > 1 && !command.exists() {
        return Err(ConnectError::CpiMissing { path: command });
    }

    let client = ExternalCpi::new(command)
        .args(cpi.args.clone())
        .context(cpi.context.clone())
        .api_version(cpi.api_version)
        .timeout(cpi.timeout);
    tracing::debug!(cpi = %client.command().display(), "Configured CPI client");
    Ok(Arc::new(client))
}

pub fn agent(loaded: &LoadedConfig) -> Result<Arc<dyn AgentClient>, ConnectError> {
    let agent = &loaded.config.agent;
    let url = agent.url.resolve().context(AgentUrlSnafu)?;
    let client = HttpAgentClient::new(&url)
        .context(AgentSnafu)?
        .request_timeout(agent.request_timeout)
        .task_poll_interval(agent.task_poll_interval);
    tracing::debug!(agent = %client.address(), "Configured agent client");
    Ok(Arc::new(client))
}

pub fn state_store(loaded: &LoadedConfig) -> Arc<dyn StateStore> {
    Arc::new(FileStateStore::new(loaded.state_path()))
}

/// Everything the lifecycle commands need, wired from one config.
pub fn manager_factory(loaded: &LoadedConfig) -> Result<ManagerFactory, ConnectError> {
    Ok(
        ManagerFactory::new(cloud(loaded)?, agent(loaded)?, state_store(loaded))
            .instance_name(loaded.config.instance.name())
            .ping_policy(loaded.config.agent.ping_policy()),
    )
}
