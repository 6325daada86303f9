pub mod probe;

// The match over `Action` lives in `run` so this module only declares them.
mod run;

use crate::{cli::globals::GlobalArgs, runner::Summary};

#[derive(Debug)]
pub enum Action {
    Run(GlobalArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error on a harness failure; failed checks are reported in the [`Summary`].
    pub async fn execute(self) -> anyhow::Result<Summary> {
        run::execute(self).await
    }
}
