// ABOUTME: Command module aggregator for the bosun CLI.
// ABOUTME: Re-exports the lifecycle, cleanup and status command handlers.

mod cleanup;
mod context;
mod delete;
mod start;
mod status;
mod stop;

pub use cleanup::cleanup;
pub use context::CommandContext;
pub use delete::delete;
pub use start::start;
pub use status::status;
pub use stop::stop;
