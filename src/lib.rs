//! # authprobe
//!
//! Black-box integration checks for a users service and an auth service that
//! together offer registration, password login and two-factor enrollment.
//!
//! ## Scenarios
//!
//! Each scenario is an ordered list of dependent HTTP steps sharing a small
//! state bag. The first failing step ends its scenario; later scenarios still
//! run. Test identities are random so runs never collide.
//!
//! - **Users service:** create, duplicate create, missing email, weak password, login.
//! - **2FA enrollment:** email channel up to token issuance, authenticator-app
//!   channel answered with a locally computed TOTP code.
//! - **Full registration:** app enrollment followed by account creation bound to it.
//! - **Rate limiting:** wrong codes against `/auth/2fa/verify` until `429`.
//!
//! ## TOTP
//!
//! [`totp`] implements RFC 6238 with HMAC-SHA1, bit-exact with authenticator
//! apps, so the app flow runs without a device.

pub mod cli;
pub mod client;
pub mod probe;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod totp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("authprobe/"));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
