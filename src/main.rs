// ABOUTME: Entry point for the bosun CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use bosun::config;
use bosun::error::Result;
use bosun::output::Output;
use clap::Parser;
use cli::{Cli, Commands};
use commands::CommandContext;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output);
    if let Err(e) = run(cli).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir()?;

    if let Commands::Init {
        deployment,
        cpi,
        force,
    } = &cli.command
    {
        config::init_config(&cwd, deployment.as_deref(), cpi.as_deref(), *force)?;
        Output::new(cli.output).success(&format!("Created {}", config::CONFIG_FILENAME));
        return Ok(());
    }

    let ctx = CommandContext::load(cli.config.as_deref(), &cwd, cli.output)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Delete { skip_drain } => commands::delete(&ctx, skip_drain).await,
        Commands::Stop { skip_drain } => commands::stop(&ctx, skip_drain).await,
        Commands::Start => commands::start(&ctx).await,
        Commands::Cleanup => commands::cleanup(&ctx).await,
        Commands::Status => commands::status(&ctx),
    }
}
