use crate::{
    cli::{
        actions::Action,
        commands::{
            checks::{ARG_NO_COLOR, ARG_RATE_LIMIT_ATTEMPTS, ARG_REPORT, ARG_SCENARIO},
            targets::{ARG_AUTH_URL, ARG_TIMEOUT, ARG_USERS_URL},
        },
        globals::GlobalArgs,
    },
    client::endpoint_url,
    runner::Stage,
};
use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};

fn base_url(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    let url = matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))?;

    endpoint_url(&url, "/").with_context(|| format!("invalid --{name}: {url}"))?;

    Ok(url)
}

/// # Errors
/// Returns an error if a base URL is invalid or a scenario name is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let mut globals = GlobalArgs::new(
        base_url(matches, ARG_USERS_URL)?,
        base_url(matches, ARG_AUTH_URL)?,
    );

    if let Some(timeout) = matches.get_one::<u64>(ARG_TIMEOUT) {
        globals.timeout = Duration::from_secs(*timeout);
    }

    if let Some(attempts) = matches.get_one::<u32>(ARG_RATE_LIMIT_ATTEMPTS) {
        globals.rate_limit_attempts = *attempts;
    }

    if let Some(names) = matches.get_many::<String>(ARG_SCENARIO) {
        let selected = names
            .map(|name| name.parse::<Stage>())
            .collect::<Result<Vec<_>>>()?;

        // execution order is fixed whatever order they were given in
        globals.stages = Stage::ALL
            .into_iter()
            .filter(|stage| selected.contains(stage))
            .collect();
    }

    globals.report_path = matches.get_one::<PathBuf>(ARG_REPORT).cloned();
    globals.color = !matches.get_flag(ARG_NO_COLOR);

    Ok(Action::Run(globals))
}
