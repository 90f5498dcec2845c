//! Authorization-header parsing.
//!
//! Both `Basic` and `Bearer` headers share the same shape: a scheme word,
//! one space, one token. Format problems are malformed-request errors
//! (400), never unauthorized (401); the latter is reserved for tokens
//! that parse but fail verification.

use anyhow::anyhow;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::utils::errors::AppError;

fn malformed() -> AppError {
    AppError::bad_request(anyhow!("Malformed authorization header"))
}

/// Splits `"<scheme> <token>"` and returns the token.
///
/// The scheme word is compared case-insensitively. Exactly two
/// space-separated parts are required.
fn split_scheme<'a>(raw: &'a str, scheme: &str) -> Result<&'a str, AppError> {
    let parts: Vec<&str> = raw.split(' ').collect();

    if parts.len() != 2 {
        return Err(malformed());
    }

    if !parts[0].eq_ignore_ascii_case(scheme) {
        return Err(malformed());
    }

    Ok(parts[1])
}

/// Decodes a `Basic base64(email:password)` header into its two fields.
pub fn parse_basic_credentials(raw: &str) -> Result<(String, String), AppError> {
    let encoded = split_scheme(raw, "basic")?;

    let decoded = BASE64.decode(encoded).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;

    let fields: Vec<&str> = decoded.split(':').collect();

    if fields.len() != 2 {
        return Err(malformed());
    }

    Ok((fields[0].to_string(), fields[1].to_string()))
}

/// Strips the `Bearer ` prefix and returns the raw token.
pub fn extract_bearer_token(raw: &str) -> Result<&str, AppError> {
    split_scheme(raw, "bearer")
}
