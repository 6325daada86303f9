use authprobe::cli::{self, telemetry};
use std::process::ExitCode;

// 0: every check passed, 1: a check failed, 2: the probe itself could not run
#[tokio::main]
async fn main() -> ExitCode {
    let action = match cli::start() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let result = action.execute().await;

    telemetry::shutdown_tracer();

    match result {
        Ok(summary) if summary.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
