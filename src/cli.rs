// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bosun::output::OutputMode;

#[derive(Parser)]
#[command(name = "bosun")]
#[command(about = "Lifecycle orchestration for a single-VM deployment")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (default: discover bosun.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "normal")]
    pub output: OutputMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new bosun.yml configuration file
    Init {
        /// Deployment name
        #[arg(short, long)]
        deployment: Option<String>,

        /// Path to the CPI executable
        #[arg(long)]
        cpi: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Delete the VM, disk and stemcell of the deployment
    Delete {
        /// Do not drain jobs before stopping them
        #[arg(long)]
        skip_drain: bool,
    },

    /// Stop jobs on the instance
    Stop {
        /// Do not drain jobs before stopping them
        #[arg(long)]
        skip_drain: bool,
    },

    /// Start jobs on the instance and wait for them to run
    Start,

    /// Delete disks and stemcells that are no longer in use
    Cleanup,

    /// Show what the state file records
    Status,
}
