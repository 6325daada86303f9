//! Rate-limit prober for the standing 2FA verify endpoint.

use crate::client::{
    types::{UserId, Verify2fa},
    Client, TransportError,
};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

/// Code that never verifies.
pub const WRONG_CODE: &str = "000000";

/// Default attempt budget, above the documented limit of 10.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub throttled: bool,
    pub attempts: u32,
}

/// Post wrong codes for `user_id` until the service answers `429` or the
/// budget runs out. A budget of zero sends nothing.
///
/// # Errors
/// Returns a [`TransportError`] if an attempt gets no HTTP response.
#[instrument(skip(client, user_id), fields(user_id = %user_id))]
pub async fn probe_rate_limit(
    client: &Client,
    user_id: &UserId,
    max_attempts: u32,
) -> Result<ProbeOutcome, TransportError> {
    let request = Verify2fa {
        user_id: user_id.clone(),
        code: WRONG_CODE.to_string(),
    };

    let mut attempts = 0;
    let mut remaining = max_attempts;

    while remaining > 0 {
        remaining -= 1;
        attempts += 1;

        let reply = client.verify_2fa(&request).await?;

        debug!(attempt = attempts, status = %reply.status, "probe attempt");

        if reply.status == StatusCode::TOO_MANY_REQUESTS {
            info!(attempts, "throttled");
            return Ok(ProbeOutcome {
                throttled: true,
                attempts,
            });
        }
    }

    warn!(attempts, "not throttled");

    Ok(ProbeOutcome {
        throttled: false,
        attempts,
    })
}
