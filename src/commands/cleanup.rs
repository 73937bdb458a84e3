// ABOUTME: Cleanup command implementation.
// ABOUTME: Deletes recorded disks and stemcells that are no longer current.

use super::context::CommandContext;
use bosun::error::Result;

pub async fn cleanup(ctx: &CommandContext) -> Result<()> {
    let mut output = ctx.output();
    output.start_timer();

    output.progress("Deleting unused disks and stemcells");
    let manager = ctx.deployment_manager()?;
    manager.cleanup(&output.stage()).await?;

    output.success("Cleanup complete");
    Ok(())
}
