// ABOUTME: Library root for bosun - exposes the orchestrator and its collaborators.
// ABOUTME: The main binary is in main.rs.

pub mod agent;
pub mod cloud;
pub mod config;
pub mod connect;
pub mod deploy;
pub mod error;
pub mod output;
pub mod state;
pub mod types;
