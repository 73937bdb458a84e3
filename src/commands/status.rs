// ABOUTME: Status command implementation.
// ABOUTME: Prints what the state file records without contacting the CPI or agent.

use super::context::CommandContext;
use bosun::deploy::DeploymentStatus;
use bosun::error::Result;

pub fn status(ctx: &CommandContext) -> Result<()> {
    let status = DeploymentStatus::load(ctx.state_store().as_ref())?;
    let lines = match &status {
        Some(status) => render(&ctx.config().deployment, status),
        None => vec![
            format!("Deployment: {}", ctx.config().deployment),
            "State: none recorded".to_string(),
        ],
    };
    ctx.output().report(&status, &lines);
    Ok(())
}

fn render(deployment: &str, status: &DeploymentStatus) -> Vec<String> {
    let none = || "none".to_string();
    let mut lines = vec![
        format!("Deployment: {}", deployment),
        format!("Director ID: {}", status.director_id),
        format!("Installation ID: {}", status.installation_id),
        format!(
            "VM: {}",
            status.vm_cid.as_ref().map(ToString::to_string).unwrap_or_else(none)
        ),
    ];
    lines.push(match &status.disk {
        Some(disk) => format!("Disk: {} ({} MiB)", disk.cid, disk.size),
        None => "Disk: none".to_string(),
    });
    lines.push(match &status.stemcell {
        Some(sc) => format!("Stemcell: {} ({}/{})", sc.cid, sc.name, sc.version),
        None => "Stemcell: none".to_string(),
    });
    lines.push(format!(
        "Unused: {} disk(s), {} stemcell(s)",
        status.unused_disks, status.unused_stemcells
    ));
    lines
}
