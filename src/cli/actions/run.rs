use crate::cli::actions::{probe, Action};
use crate::runner::Summary;
use anyhow::Result;

/// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<Summary> {
    match action {
        Action::Run(globals) => probe::execute(globals).await,
    }
}
