use super::TotpError;
use data_encoding::{Encoding, Specification};

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn decode_error(input: &str, reason: impl ToString) -> TotpError {
    TotpError::Decode {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

// RFC 4648 base32, case-insensitive. Trailing bits are not checked, some
// providers emit secrets whose last character carries non-zero filler bits.
fn encoding(padded: bool) -> Result<Encoding, TotpError> {
    let mut spec = Specification::new();
    spec.symbols.push_str(ALPHABET);
    spec.translate.from.push_str("abcdefghijklmnopqrstuvwxyz");
    spec.translate.to.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    spec.check_trailing_bits = false;
    if padded {
        spec.padding = Some('=');
    }

    spec.encoding()
        .map_err(|e| decode_error(ALPHABET, format!("base32 specification: {e}")))
}

/// Decode a base-32 shared secret into raw key bytes.
///
/// Accepts upper or lower case and secrets with or without `=` padding. When
/// padding is present it must be complete (a multiple of 8 characters).
///
/// # Errors
/// Returns [`TotpError::Decode`] with the offending input when the secret is
/// empty, holds characters outside the base-32 alphabet, or is badly padded.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, TotpError> {
    if secret.is_empty() {
        return Err(decode_error(secret, "empty secret"));
    }

    let padded = secret.contains('=');

    let key = encoding(padded)?
        .decode(secret.as_bytes())
        .map_err(|e| decode_error(secret, e))?;

    if key.is_empty() {
        return Err(decode_error(secret, "secret decodes to an empty key"));
    }

    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rfc_key() {
        let key = decode_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(key, b"12345678901234567890");
    }

    #[test]
    fn decodes_lowercase_and_mixed_case() {
        assert_eq!(decode_secret("mzxw6ytboi").unwrap(), b"foobar");
        assert_eq!(decode_secret("MzXw6YtBoI").unwrap(), b"foobar");
    }

    #[test]
    fn accepts_unpadded_and_padded_forms() {
        assert_eq!(decode_secret("MZXW6").unwrap(), b"foo");
        assert_eq!(decode_secret("MZXW6===").unwrap(), b"foo");
        assert_eq!(decode_secret("MZXW6YQ=").unwrap(), b"foob");
        assert_eq!(decode_secret("MZXW6YQ").unwrap(), b"foob");
    }

    #[test]
    fn rejects_incomplete_padding() {
        let err = decode_secret("MZXW6=").unwrap_err();
        assert!(matches!(err, TotpError::Decode { ref input, .. } if input == "MZXW6="));
    }

    #[test]
    fn rejects_padding_in_the_middle() {
        assert!(decode_secret("MZ=XW6==").is_err());
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for secret in ["GEZDGNB1", "GEZDGNB8", "GEZD GNBV", "GEZDGNB!"] {
            let err = decode_secret(secret).unwrap_err();
            assert!(
                matches!(err, TotpError::Decode { ref input, .. } if input == secret),
                "{secret}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_impossible_lengths() {
        // 1, 3 and 6 characters never form whole bytes
        for secret in ["M", "MZX", "MZXW6Y"] {
            assert!(decode_secret(secret).is_err(), "{secret}");
        }
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(
            decode_secret(""),
            Err(TotpError::Decode { .. })
        ));
    }

    #[test]
    fn error_message_carries_input() {
        let err = decode_secret("bad!secret").unwrap_err();
        assert!(err.to_string().contains("bad!secret"));
    }
}
