//! Pre-install license check
//!
//! Runs as a Helm pre-install hook: refuses to install when the Dashboard
//! license is missing or already expired. Only the JWT payload is inspected;
//! the Dashboard itself verifies the signature.

use crate::error::{BootstrapError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LicenseClaims {
    exp: Option<i64>,
}

/// Check `key` and return its expiry time.
pub fn validate_license(key: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(BootstrapError::License(
            "Dashboard license is not set".to_string(),
        ));
    }

    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 3 {
        return Err(BootstrapError::License(
            "license is not a JWT".to_string(),
        ));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| BootstrapError::License(format!("malformed license payload: {}", e)))?;
    let claims: LicenseClaims = serde_json::from_slice(&payload)
        .map_err(|e| BootstrapError::License(format!("malformed license claims: {}", e)))?;

    let exp = claims
        .exp
        .ok_or_else(|| BootstrapError::License("license has no expiry".to_string()))?;
    let expires_at = DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| BootstrapError::License(format!("invalid expiry {}", exp)))?;

    if expires_at <= now {
        return Err(BootstrapError::License(format!(
            "license expired at {}",
            expires_at.to_rfc3339()
        )));
    }
    Ok(expires_at)
}
