//! Step executor.
//!
//! A [`Scenario`] is an ordered list of [`Step`]s that share one
//! [`ScenarioState`]. Steps run strictly one after another: each step builds a
//! typed call from the state, sends it, checks the status, then writes what it
//! learned back into the state. The first failing step ends the scenario,
//! later steps would otherwise read values that were never written.

pub mod catalogue;
pub mod identity;
pub mod state;

pub use self::state::{ScenarioState, StateKey};

use crate::client::{
    types::{CreateUser, Initiate2fa, Login, Verify2fa, VerifyRegistration},
    Client, Reply, TransportError,
};
use crate::report::CheckResult;
use crate::totp::TotpError;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum StepError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("expected {expected}, got {status}, body: {body}")]
    Unexpected {
        expected: Expect,
        status: StatusCode,
        body: String,
    },
    #[error("unexpected response body ({reason}), body: {body}")]
    Schema { reason: String, body: String },
    #[error("missing scenario state: {0}")]
    MissingState(StateKey),
    /// A harness bug or a changed service contract, never a service defect.
    #[error("harness error, cannot compute TOTP code: {0}")]
    Totp(#[from] TotpError),
}

impl StepError {
    /// Schema mismatch for a body that parsed badly or lacked a field.
    pub fn schema(reply: &Reply, reason: impl fmt::Display) -> Self {
        Self::Schema {
            reason: reason.to_string(),
            body: reply.snippet(),
        }
    }
}

/// Expected outcome of a step, judged on the HTTP status alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    Status(StatusCode),
    Not(StatusCode),
}

impl Expect {
    #[must_use]
    pub fn matches(&self, status: StatusCode) -> bool {
        match self {
            Self::Status(expected) => status == *expected,
            Self::Not(rejected) => status != *rejected,
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::Not(status) => write!(f, "anything but {status}"),
        }
    }
}

/// One typed request against the services under test.
#[derive(Clone, Debug)]
pub enum Call {
    CreateUser(CreateUser),
    Login(Login),
    Initiate2fa(Initiate2fa),
    VerifyRegistration(VerifyRegistration),
    Verify2fa(Verify2fa),
}

impl Call {
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    pub async fn dispatch(&self, client: &Client) -> Result<Reply, TransportError> {
        match self {
            Self::CreateUser(request) => client.create_user(request).await,
            Self::Login(request) => client.login(request).await,
            Self::Initiate2fa(request) => client.initiate_2fa(request).await,
            Self::VerifyRegistration(request) => client.verify_registration(request).await,
            Self::Verify2fa(request) => client.verify_2fa(request).await,
        }
    }
}

type Action = Box<dyn Fn(&ScenarioState) -> Result<Call, StepError> + Send + Sync>;
type Update = fn(&Reply, &mut ScenarioState) -> Result<(), StepError>;

pub struct Step {
    name: String,
    action: Action,
    expect: Expect,
    update: Option<Update>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("expect", &self.expect)
            .field("update", &self.update.is_some())
            .finish_non_exhaustive()
    }
}

impl Step {
    /// A step expecting `200 OK` with no state update.
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&ScenarioState) -> Result<Call, StepError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
            expect: Expect::Status(StatusCode::OK),
            update: None,
        }
    }

    #[must_use]
    pub fn expect(mut self, expect: Expect) -> Self {
        self.expect = expect;
        self
    }

    #[must_use]
    pub fn expect_status(self, status: StatusCode) -> Self {
        self.expect(Expect::Status(status))
    }

    /// State update applied only when the expectation holds.
    #[must_use]
    pub fn then(mut self, update: Update) -> Self {
        self.update = Some(update);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, client: &Client, state: &mut ScenarioState) -> Result<(), StepError> {
        let call = (self.action)(state)?;

        let reply = call.dispatch(client).await?;

        if !self.expect.matches(reply.status) {
            return Err(StepError::Unexpected {
                expected: self.expect,
                status: reply.status,
                body: reply.snippet(),
            });
        }

        if let Some(update) = self.update {
            update(&reply, state)?;
        }

        Ok(())
    }
}

pub struct Scenario {
    name: String,
    steps: Vec<Step>,
    state: ScenarioState,
    exports: Vec<StateKey>,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("state", &self.state)
            .field("exports", &self.exports)
            .finish()
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            state: ScenarioState::new(),
            exports: Vec::new(),
        }
    }

    /// Value available to the first step.
    #[must_use]
    pub fn seed(mut self, key: StateKey, value: impl Into<String>) -> Self {
        self.state.set(key, value);
        self
    }

    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Hand `key` to whoever consumes the outcome, once every step passed.
    #[must_use]
    pub fn export(mut self, key: StateKey) -> Self {
        self.exports.push(key);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub results: Vec<CheckResult>,
    pub completed: bool,
    /// Steps never attempted because an earlier one failed.
    pub skipped: usize,
    /// Exported values; empty unless the scenario completed.
    pub handoff: ScenarioState,
}

impl ScenarioOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.completed && self.results.iter().all(|result| result.passed)
    }
}

/// Run every step of `scenario` in order, stopping at the first failure.
#[instrument(skip_all, fields(scenario = %scenario.name))]
pub async fn run_scenario(client: &Client, scenario: Scenario) -> ScenarioOutcome {
    let Scenario {
        name,
        steps,
        mut state,
        exports,
    } = scenario;

    let total = steps.len();
    let mut results = Vec::with_capacity(total);

    info!(steps = total, "starting scenario");

    for (index, step) in steps.iter().enumerate() {
        debug!(step = %step.name, ?state, "running step");

        match step.execute(client, &mut state).await {
            Ok(()) => results.push(CheckResult::pass(&step.name)),
            Err(e) => {
                if let StepError::Transport(ref transport) = e {
                    error!(step = %step.name, "transport failure: {transport}");
                } else {
                    warn!(step = %step.name, "step failed: {e}");
                }

                results.push(CheckResult::fail(&step.name, e.to_string()));

                let skipped = total - index - 1;
                if skipped > 0 {
                    info!(skipped, "aborting scenario");
                }

                return ScenarioOutcome {
                    name,
                    results,
                    completed: false,
                    skipped,
                    handoff: ScenarioState::new(),
                };
            }
        }
    }

    info!("scenario completed");

    ScenarioOutcome {
        name,
        results,
        completed: true,
        skipped: 0,
        handoff: state.retain(&exports),
    }
}
