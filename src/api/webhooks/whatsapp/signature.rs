//! Webhook payload signatures and token comparison

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying `sha256=<hex>` over the raw request body
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Verify a `X-Hub-Signature-256` header value against the raw body
///
/// # Errors
///
/// Returns [`Error::Signature`] if the header is malformed or does not match
pub fn verify_signature(body: &[u8], signature_header: &str, app_secret: &str) -> Result<()> {
    let expected = signature_header
        .strip_prefix("sha256=")
        .ok_or_else(|| Error::Signature("missing sha256= prefix".to_string()))?;

    let computed = hmac_hex(body, app_secret)?;

    if constant_time_eq(&computed, &expected.to_ascii_lowercase()) {
        Ok(())
    } else {
        Err(Error::Signature("signature mismatch".to_string()))
    }
}

/// Produce the header value the platform would send for `body`
///
/// # Errors
///
/// Returns [`Error::Signature`] if the secret cannot key the HMAC
pub fn sign(body: &[u8], app_secret: &str) -> Result<String> {
    Ok(format!("sha256={}", hmac_hex(body, app_secret)?))
}

fn hmac_hex(body: &[u8], app_secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| Error::Signature(format!("invalid app secret: {e}")))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
