// ABOUTME: Delete command implementation.
// ABOUTME: Tears down the instance, then the disk, then the stemcell.

use super::context::CommandContext;
use bosun::error::Result;

pub async fn delete(ctx: &CommandContext, skip_drain: bool) -> Result<()> {
    let mut output = ctx.output();
    output.start_timer();

    let manager = ctx.deployment_manager()?;
    let Some(mut deployment) = manager.find_current()? else {
        output.success("No deployment to delete");
        return Ok(());
    };

    output.progress(&format!("Deleting deployment '{}'", ctx.config().deployment));
    let stage = output.stage();
    deployment.delete(skip_drain, &stage).await?;

    output.success("Deployment deleted");
    Ok(())
}
