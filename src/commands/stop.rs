// ABOUTME: Stop command implementation.
// ABOUTME: Runs the stop sequence against the current instance.

use super::context::CommandContext;
use bosun::error::Result;

pub async fn stop(ctx: &CommandContext, skip_drain: bool) -> Result<()> {
    let mut output = ctx.output();
    output.start_timer();

    let manager = ctx.deployment_manager()?;
    let Some(deployment) = manager.find_current()? else {
        output.success("No deployment to stop");
        return Ok(());
    };

    output.progress(&format!("Stopping deployment '{}'", ctx.config().deployment));
    deployment.stop(skip_drain, &output.stage()).await?;

    output.success("Deployment stopped");
    Ok(())
}
