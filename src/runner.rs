//! Top-level run: reachability preflight, the selected scenarios in order,
//! then the rate-limit probe fed by the full registration flow.

use crate::{
    cli::globals::GlobalArgs,
    client::{Client, Service},
    probe::probe_rate_limit,
    report::{CheckResult, Reporter},
    scenario::{catalogue, run_scenario, ScenarioState},
};
use anyhow::{anyhow, Result};
use std::{fmt, io, io::Write, str::FromStr};
use tracing::{debug, error, info, info_span, Instrument};
use ulid::Ulid;

pub const REACHABILITY_CHECK: &str = "Service Reachability";
pub const RATE_LIMIT_CHECK: &str = "Rate Limiting (2FA Verify)";

/// A selectable part of the run, listed in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Users,
    EmailEnrollment,
    AppEnrollment,
    FullFlow,
    RateLimit,
}

impl Stage {
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::EmailEnrollment,
        Self::AppEnrollment,
        Self::FullFlow,
        Self::RateLimit,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::EmailEnrollment => "2fa-email",
            Self::AppEnrollment => "2fa-app",
            Self::FullFlow => "full-flow",
            Self::RateLimit => "rate-limit",
        }
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|stage| stage.name()).collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == s.trim())
            .ok_or_else(|| {
                anyhow!(
                    "unknown scenario '{s}', expected one of: {}",
                    Self::names().join(", ")
                )
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub run_id: Ulid,
    pub passed: usize,
    pub failed: usize,
    /// Set when the preflight found a service down and nothing else ran.
    pub outage: bool,
}

impl Summary {
    #[must_use]
    pub const fn success(&self) -> bool {
        !self.outage && self.failed == 0
    }
}

/// Run every selected stage, printing checks to stdout.
///
/// # Errors
/// Returns an error on a harness failure: an invalid base URL, stdout not
/// writable, or the JSON report not written. Failed checks are not errors.
pub async fn run(globals: &GlobalArgs) -> Result<Summary> {
    let client = Client::new(globals)?;
    let mut reporter = Reporter::new(io::stdout(), globals.color);

    run_with(&client, globals, &mut reporter).await
}

/// [`run`] with an explicit client and output.
///
/// # Errors
/// See [`run`].
pub async fn run_with<W: Write>(
    client: &Client,
    globals: &GlobalArgs,
    reporter: &mut Reporter<W>,
) -> Result<Summary> {
    let run_id = Ulid::new();
    let span = info_span!("run", run_id = %run_id);

    async move {
        info!(stages = ?globals.stages, "starting run");

        let outage = !preflight(client, reporter).await?;

        if !outage {
            let mut handoff = None;

            for stage in &globals.stages {
                let scenario = match stage {
                    Stage::Users => catalogue::user_lifecycle(),
                    Stage::EmailEnrollment => catalogue::enrollment_email(),
                    Stage::AppEnrollment => catalogue::enrollment_app(),
                    Stage::FullFlow => catalogue::full_registration(),
                    Stage::RateLimit => {
                        rate_limit(client, globals, handoff.as_ref(), reporter).await?;
                        continue;
                    }
                };

                reporter.section(scenario.name())?;

                let outcome = run_scenario(client, scenario).await;

                for result in outcome.results {
                    reporter.record(result)?;
                }

                if *stage == Stage::FullFlow {
                    handoff = Some(outcome.handoff);
                }
            }
        }

        reporter.summary()?;

        if let Some(path) = &globals.report_path {
            reporter.write_json(path, &run_id.to_string())?;
            info!(path = %path.display(), "report written");
        }

        let summary = Summary {
            run_id,
            passed: reporter.passed(),
            failed: reporter.failed(),
            outage,
        };

        info!(passed = summary.passed, failed = summary.failed, "run finished");

        Ok(summary)
    }
    .instrument(span)
    .await
}

/// Returns false, after recording a single failed check, when any service is
/// unreachable.
async fn preflight<W: Write>(client: &Client, reporter: &mut Reporter<W>) -> Result<bool> {
    let mut down = Vec::new();

    for service in [Service::Users, Service::Auth] {
        let url = client.base_url(service);
        match client.reachable(service).await {
            Ok(status) => debug!(%service, %status, "reachable"),
            Err(e) => {
                error!(%service, "unreachable: {e}");
                down.push(format!("{service} at {url}"));
            }
        }
    }

    if down.is_empty() {
        return Ok(true);
    }

    reporter.section("Preflight")?;
    reporter.record(CheckResult::fail(
        REACHABILITY_CHECK,
        format!(
            "could not connect to {}, make sure the services are running",
            down.join(" and ")
        ),
    ))?;

    Ok(false)
}

async fn rate_limit<W: Write>(
    client: &Client,
    globals: &GlobalArgs,
    handoff: Option<&ScenarioState>,
    reporter: &mut Reporter<W>,
) -> Result<()> {
    reporter.section("Rate Limiting")?;

    let Some(user_id) = handoff.and_then(|state| state.user_id().ok()) else {
        return Ok(reporter.record(CheckResult::fail(
            RATE_LIMIT_CHECK,
            "no user id handed off by the full registration flow",
        ))?);
    };

    let result = match probe_rate_limit(client, &user_id, globals.rate_limit_attempts).await {
        Ok(outcome) if outcome.throttled => CheckResult::pass(RATE_LIMIT_CHECK),
        Ok(outcome) => CheckResult::fail(
            RATE_LIMIT_CHECK,
            format!(
                "did not hit rate limit after {} attempts",
                outcome.attempts
            ),
        ),
        Err(e) => CheckResult::fail(RATE_LIMIT_CHECK, format!("transport error: {e}")),
    };

    Ok(reporter.record(result)?)
}
