use crate::{cli::globals::GlobalArgs, runner};
use anyhow::{Context, Result};
use tracing::debug;

/// Run the selected checks against the configured services.
/// # Errors
/// Returns an error if the run could not be carried out.
pub async fn execute(globals: GlobalArgs) -> Result<runner::Summary> {
    debug!(?globals, "running checks");

    let summary = runner::run(&globals)
        .await
        .context("Failed to run checks")?;

    Ok(summary)
}
