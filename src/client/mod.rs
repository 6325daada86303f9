//! Typed HTTP transport for the services under test.
//!
//! One [`reqwest::Client`] is built per run with a bounded timeout, so an
//! unreachable service fails a step instead of blocking it forever.

pub mod types;

use self::types::{CreateUser, Initiate2fa, Login, Verify2fa, VerifyRegistration};
use crate::{cli::globals::GlobalArgs, APP_USER_AGENT};
use anyhow::{anyhow, bail, Context, Result};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Maximum number of body characters kept in diagnostics.
const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    fn classify(url: &str, timeout: Duration, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url, timeout }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else {
            Self::Request { url, source }
        }
    }
}

/// The two collaborators the probe talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    Users,
    Auth,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => f.write_str("users service"),
            Self::Auth => f.write_str("auth service"),
        }
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Parse the body into a typed schema.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Body shortened for log lines and failed checks.
    #[must_use]
    pub fn snippet(&self) -> String {
        snippet(&self.body)
    }
}

pub(crate) fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }

    let mut short: String = body.chars().take(MAX_BODY_CHARS).collect();
    short.push('…');
    short
}

/// Absolute URL of `path` on a service. The port is always spelled out so log
/// lines show exactly where a request went, and a path prefix on the base
/// (a gateway mount such as `/api`) is kept in front of `path`.
///
/// # Errors
/// Returns an error if `base` cannot be parsed, has no host, or is not http(s).
pub fn endpoint_url(base: &str, path: &str) -> Result<String> {
    let base = Url::parse(base).with_context(|| format!("invalid service URL: {base}"))?;

    let scheme = base.scheme();
    if !matches!(scheme, "http" | "https") {
        bail!("unsupported scheme {scheme} in service URL {base}");
    }

    let host = base
        .host_str()
        .ok_or_else(|| anyhow!("service URL {base} has no host"))?;
    let port = base
        .port_or_known_default()
        .ok_or_else(|| anyhow!("service URL {base} has no port"))?;
    let prefix = base.path().trim_end_matches('/');

    let endpoint = format!("{scheme}://{host}:{port}{prefix}{path}");

    debug!(endpoint, "endpoint URL");

    Ok(endpoint)
}

#[derive(Clone, Debug)]
struct Endpoints {
    users_base: String,
    auth_base: String,
    users: String,
    login: String,
    initiate: String,
    verify_registration: String,
    verify: String,
}

impl Endpoints {
    fn new(users_url: &str, auth_url: &str) -> Result<Self> {
        Ok(Self {
            users_base: endpoint_url(users_url, "/")?,
            auth_base: endpoint_url(auth_url, "/")?,
            users: endpoint_url(users_url, "/users")?,
            login: endpoint_url(users_url, "/auth/login")?,
            initiate: endpoint_url(auth_url, "/auth/2fa/register/initiate")?,
            verify_registration: endpoint_url(auth_url, "/auth/2fa/register/verify")?,
            verify: endpoint_url(auth_url, "/auth/2fa/verify")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    timeout: Duration,
    endpoints: Endpoints,
}

impl Client {
    /// Build the client for one run.
    ///
    /// # Errors
    /// Returns an error if a base URL is invalid or the HTTP client cannot be built.
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(globals.timeout)
            .connect_timeout(globals.timeout)
            .build()?;

        Ok(Self {
            http,
            timeout: globals.timeout,
            endpoints: Endpoints::new(&globals.users_url, &globals.auth_url)?,
        })
    }

    #[must_use]
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Users => &self.endpoints.users_base,
            Service::Auth => &self.endpoints.auth_base,
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Reply, TransportError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::classify(url, self.timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::classify(url, self.timeout, e))?;

        debug!(%status, url, "response received");

        Ok(Reply { status, body })
    }

    /// `POST /users` on the users service.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    #[instrument(skip_all)]
    pub async fn create_user(&self, request: &CreateUser) -> Result<Reply, TransportError> {
        self.post(&self.endpoints.users, request).await
    }

    /// `POST /auth/login` on the users service.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &Login) -> Result<Reply, TransportError> {
        self.post(&self.endpoints.login, request).await
    }

    /// `POST /auth/2fa/register/initiate` on the auth service.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    #[instrument(skip_all, fields(auth_type = ?request.auth_type))]
    pub async fn initiate_2fa(&self, request: &Initiate2fa) -> Result<Reply, TransportError> {
        self.post(&self.endpoints.initiate, request).await
    }

    /// `POST /auth/2fa/register/verify` on the auth service.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    #[instrument(skip_all)]
    pub async fn verify_registration(
        &self,
        request: &VerifyRegistration,
    ) -> Result<Reply, TransportError> {
        self.post(&self.endpoints.verify_registration, request).await
    }

    /// `POST /auth/2fa/verify` on the auth service.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if no HTTP response was received.
    #[instrument(skip_all, fields(user_id = %request.user_id))]
    pub async fn verify_2fa(&self, request: &Verify2fa) -> Result<Reply, TransportError> {
        self.post(&self.endpoints.verify, request).await
    }

    /// Any HTTP answer from the base URL, whatever its status, counts as reachable.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the service did not answer.
    #[instrument(skip(self))]
    pub async fn reachable(&self, service: Service) -> Result<StatusCode, TransportError> {
        let url = self.base_url(service);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::classify(url, self.timeout, e))?;

        Ok(response.status())
    }
}
