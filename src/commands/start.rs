// ABOUTME: Start command implementation.
// ABOUTME: Starts jobs and waits for the instance to report running.

use super::context::CommandContext;
use bosun::error::Result;

pub async fn start(ctx: &CommandContext) -> Result<()> {
    let mut output = ctx.output();
    output.start_timer();

    let manager = ctx.deployment_manager()?;
    let Some(deployment) = manager.find_current()? else {
        output.success("No deployment to start");
        return Ok(());
    };

    output.progress(&format!("Starting deployment '{}'", ctx.config().deployment));
    deployment
        .start(ctx.config().update, &output.stage())
        .await?;

    output.success("Deployment started");
    Ok(())
}
