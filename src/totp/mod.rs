//! Time-based one-time passwords (RFC 6238 on top of RFC 4226 HOTP).
//!
//! The authenticator-app enrollment flow hands out a base-32 shared secret;
//! this module turns that secret plus the wall clock into the same 6-digit code
//! a phone app would display, so the flow can be driven without a device.

mod secret;

pub use self::secret::decode_secret;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

pub const DEFAULT_STEP_SECONDS: u64 = 30;
pub const DEFAULT_DIGITS: u32 = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TotpError {
    /// The shared secret is not valid base-32. Carries the offending input.
    #[error("invalid base32 secret {input:?}: {reason}")]
    Decode { input: String, reason: String },
    #[error("time step must be at least one second")]
    InvalidStep,
    #[error("invalid digits: {0} (must be 1-9)")]
    InvalidDigits(u32),
    #[error("system clock is before the unix epoch")]
    Clock,
}

/// Generate the current code for `secret` with a 30 second step and 6 digits.
///
/// # Errors
/// Returns [`TotpError::Decode`] if the secret is not base-32.
pub fn generate_code(secret: &str) -> Result<String, TotpError> {
    Totp::new(secret)?.generate()
}

#[derive(Clone)]
pub struct Totp {
    key: Vec<u8>,
    step: u64,
    digits: u32,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp")
            .field("key", &"***")
            .field("step", &self.step)
            .field("digits", &self.digits)
            .finish()
    }
}

impl Totp {
    /// # Errors
    /// Returns [`TotpError::Decode`] if the secret is not base-32.
    pub fn new(secret: &str) -> Result<Self, TotpError> {
        Ok(Self {
            key: decode_secret(secret)?,
            step: DEFAULT_STEP_SECONDS,
            digits: DEFAULT_DIGITS,
        })
    }

    #[must_use]
    pub const fn step(mut self, seconds: u64) -> Self {
        self.step = seconds;
        self
    }

    #[must_use]
    pub const fn digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// Code for the current wall-clock time. The clock is read on every call,
    /// so two calls straddling a step boundary return different codes.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the clock is before the epoch.
    pub fn generate(&self) -> Result<String, TotpError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TotpError::Clock)?;

        self.generate_at(now.as_secs())
    }

    /// Code for an explicit unix timestamp.
    ///
    /// # Errors
    /// Returns an error if the step is zero or the digit count is out of range.
    pub fn generate_at(&self, unix_seconds: u64) -> Result<String, TotpError> {
        if self.step == 0 {
            return Err(TotpError::InvalidStep);
        }

        hotp(&self.key, unix_seconds / self.step, self.digits)
    }
}

/// HOTP value for a raw key and counter (RFC 4226 section 5.3).
///
/// # Errors
/// Returns an error if `digits` is outside `1..=9`.
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<String, TotpError> {
    if !(1..=9).contains(&digits) {
        return Err(TotpError::InvalidDigits(digits));
    }

    let Ok(mut mac) = HmacSha1::new_from_slice(key) else {
        unreachable!("hmac takes keys of any length");
    };
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // dynamic truncation
    let offset = usize::from(digest[19] & 0x0f);
    let binary = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    let code = u64::from(binary) % 10u64.pow(digits);

    Ok(format!("{code:0width$}", width = digits as usize))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // "12345678901234567890", the RFC 4226/6238 SHA-1 test key
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn hotp_matches_rfc4226_vectors() {
        let key = b"12345678901234567890";
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];
        for (counter, code) in expected.iter().enumerate() {
            assert_eq!(hotp(key, counter as u64, 6).unwrap(), *code);
        }
    }

    #[test]
    fn hotp_takes_keys_of_any_length() {
        for key in [&[][..], &[7u8; 1][..], &[7u8; 64][..], &[7u8; 200][..]] {
            let code = hotp(key, 1, 6).unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn totp_matches_rfc6238_sha1_vectors() {
        let totp = Totp::new(RFC_SECRET).unwrap().digits(8);
        let vectors = [
            (59, "94287082"),
            (1_111_111_109, "07081804"),
            (1_111_111_111, "14050471"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
            (20_000_000_000, "65353130"),
        ];
        for (time, code) in vectors {
            assert_eq!(totp.generate_at(time).unwrap(), code, "time {time}");
        }
    }

    #[test]
    fn six_digit_codes_are_left_padded() {
        let totp = Totp::new(RFC_SECRET).unwrap();
        assert_eq!(totp.generate_at(1_111_111_109).unwrap(), "081804");
        assert_eq!(totp.generate_at(1_234_567_890).unwrap(), "005924");
    }

    #[test]
    fn codes_are_stable_within_a_window() {
        let totp = Totp::new(RFC_SECRET).unwrap();
        let window_start = 1_700_000_010 - (1_700_000_010 % 30);
        let first = totp.generate_at(window_start).unwrap();
        for offset in 1..30 {
            assert_eq!(totp.generate_at(window_start + offset).unwrap(), first);
        }
    }

    #[test]
    fn codes_change_across_a_boundary() {
        let totp = Totp::new(RFC_SECRET).unwrap();
        assert_eq!(totp.generate_at(59).unwrap(), "287082");
        assert_eq!(totp.generate_at(60).unwrap(), "359152");
    }

    #[test]
    fn codes_are_always_decimal_and_fixed_width() {
        let totp = Totp::new("JBSWY3DPEHPK3PXP").unwrap();
        for i in 0..500u64 {
            let code = totp.generate_at(i * 30).unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()), "{code}");
        }
    }

    #[test]
    fn lowercase_secret_yields_same_code() {
        let upper = Totp::new(RFC_SECRET).unwrap();
        let lower = Totp::new(&RFC_SECRET.to_lowercase()).unwrap();
        assert_eq!(
            upper.generate_at(1_234_567_890).unwrap(),
            lower.generate_at(1_234_567_890).unwrap()
        );
    }

    #[test]
    fn generate_code_uses_defaults() {
        let code = generate_code(RFC_SECRET).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn generate_code_rejects_bad_secret() {
        let err = generate_code("not base32!").unwrap_err();
        match err {
            TotpError::Decode { input, .. } => assert_eq!(input, "not base32!"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_step_is_rejected() {
        let totp = Totp::new(RFC_SECRET).unwrap().step(0);
        assert_eq!(totp.generate_at(59), Err(TotpError::InvalidStep));
    }

    #[test]
    fn digit_range_is_enforced() {
        let totp = Totp::new(RFC_SECRET).unwrap();
        assert_eq!(
            totp.clone().digits(0).generate_at(59),
            Err(TotpError::InvalidDigits(0))
        );
        assert_eq!(
            totp.digits(10).generate_at(59),
            Err(TotpError::InvalidDigits(10))
        );
    }

    #[test]
    fn custom_step_changes_counter() {
        let totp = Totp::new(RFC_SECRET).unwrap().step(60);
        // counter 1 for both 60 and 119 with a 60 second step
        assert_eq!(totp.generate_at(60).unwrap(), "287082");
        assert_eq!(totp.generate_at(119).unwrap(), "287082");
    }

    #[test]
    fn agrees_with_totp_rs() {
        let secret = "JBSWY3DPEHPK3PXP";
        let ours = Totp::new(secret).unwrap();
        let reference = totp_rs::TOTP::new_unchecked(
            totp_rs::Algorithm::SHA1,
            6,
            1,
            30,
            decode_secret(secret).unwrap(),
        );

        for t in [0, 29, 30, 1_111_111_109, 1_700_000_000, 2_000_000_000] {
            assert_eq!(ours.generate_at(t).unwrap(), reference.generate(t), "t={t}");
        }
    }

    #[test]
    fn debug_does_not_leak_key() {
        let totp = Totp::new(RFC_SECRET).unwrap();
        let debug = format!("{totp:?}");
        assert!(!debug.contains("49"));
        assert!(debug.contains("***"));
    }
}
