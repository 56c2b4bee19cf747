//! Signed, short-lived links for the quick-request storefront.
//!
//! A token is `base64url_nopad("{user_id}:{expiry_ms}:{mac}")` where `mac` is
//! the first 16 hex characters of HMAC-SHA256 over `"{user_id}:{expiry_ms}"`.
//! A token is accepted while `now_ms <= expiry_ms`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const MAC_HEX_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("bad signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("invalid signing key")]
    InvalidKey,
}

fn mac_hex(secret: &[u8], payload: &str) -> Result<String, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload.as_bytes());
    let mut digest = hex::encode(mac.finalize().into_bytes());
    digest.truncate(MAC_HEX_LEN);
    Ok(digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn issue(secret: &[u8], user_id: i32, expires_at_ms: i64) -> Result<String, TokenError> {
    let payload = format!("{user_id}:{expires_at_ms}");
    let mac = mac_hex(secret, &payload)?;
    Ok(URL_SAFE_NO_PAD.encode(format!("{payload}:{mac}")))
}

/// Returns the user id carried by a valid token.
pub fn verify(secret: &[u8], token: &str, now_ms: i64) -> Result<i32, TokenError> {
    let raw = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|_| TokenError::Malformed)?;
    let raw = String::from_utf8(raw).map_err(|_| TokenError::Malformed)?;

    let mut parts = raw.splitn(3, ':');
    let (Some(user_part), Some(expiry_part), Some(mac_part)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let user_id: i32 = user_part.parse().map_err(|_| TokenError::Malformed)?;
    let expires_at_ms: i64 = expiry_part.parse().map_err(|_| TokenError::Malformed)?;

    // Non-canonical numbers such as "07" never verify.
    let expected = mac_hex(secret, &format!("{user_id}:{expires_at_ms}"))?;
    if format!("{user_id}:{expires_at_ms}") != format!("{user_part}:{expiry_part}")
        || !constant_time_eq(expected.as_bytes(), mac_part.as_bytes())
    {
        return Err(TokenError::BadSignature);
    }

    if now_ms > expires_at_ms {
        return Err(TokenError::Expired);
    }

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"storefront-test-secret";
    const EXPIRY: i64 = 1_760_000_000_000;

    #[test]
    fn test_valid_until_expiry_inclusive() {
        let token = issue(SECRET, 42, EXPIRY).unwrap();
        assert_eq!(verify(SECRET, &token, EXPIRY - 60_000), Ok(42));
        assert_eq!(verify(SECRET, &token, EXPIRY), Ok(42));
        assert_eq!(verify(SECRET, &token, EXPIRY + 1), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_layout() {
        let token = issue(SECRET, 7, EXPIRY).unwrap();
        assert!(!token.contains('='));
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&token).unwrap()).unwrap();
        let parts: Vec<&str> = decoded.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "7");
        assert_eq!(parts[1], EXPIRY.to_string());
        assert_eq!(parts[2].len(), 16);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issue(SECRET, 7, EXPIRY).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&token).unwrap()).unwrap();
        let mac = decoded.rsplit(':').next().unwrap();

        let other_user = URL_SAFE_NO_PAD.encode(format!("8:{EXPIRY}:{mac}"));
        assert_eq!(
            verify(SECRET, &other_user, 0),
            Err(TokenError::BadSignature)
        );

        let longer = URL_SAFE_NO_PAD.encode(format!("7:{}:{mac}", EXPIRY + 3_600_000));
        assert_eq!(verify(SECRET, &longer, 0), Err(TokenError::BadSignature));

        let padded_id = URL_SAFE_NO_PAD.encode(format!("07:{EXPIRY}:{mac}"));
        assert_eq!(verify(SECRET, &padded_id, 0), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let token = issue(SECRET, 7, EXPIRY).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&token).unwrap()).unwrap();
        let mut flipped = decoded.clone();
        let last = flipped.pop().unwrap();
        flipped.push(if last == '0' { '1' } else { '0' });

        let forged = URL_SAFE_NO_PAD.encode(flipped);
        assert_eq!(verify(SECRET, &forged, 0), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(SECRET, 7, EXPIRY).unwrap();
        assert_eq!(
            verify(b"another-secret", &token, 0),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(verify(SECRET, "!!!", 0), Err(TokenError::Malformed));
        let two_parts = URL_SAFE_NO_PAD.encode("7:123");
        assert_eq!(verify(SECRET, &two_parts, 0), Err(TokenError::Malformed));
        let not_number = URL_SAFE_NO_PAD.encode("x:123:abcdef0123456789");
        assert_eq!(verify(SECRET, &not_number, 0), Err(TokenError::Malformed));
    }
}
