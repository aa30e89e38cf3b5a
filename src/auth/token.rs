use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::ApiError;
use crate::records::UserRole;

type HmacSha256 = Hmac<Sha256>;

/// Session token claims. `role` is the role at issue time; the effective
/// role is re-resolved on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed session token: `base64url(claims json) . hex(hmac-sha256)`.
/// Verifiable from signature and expiry alone, without a store read.
pub fn issue(
    secret: &str,
    user_id: &str,
    email: &str,
    role: UserRole,
    ttl_hours: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_owned(),
        email: email.to_owned(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&claims).map_err(|e| ApiError::Internal(e.into()))?,
    );
    Ok(format!("{payload}.{}", sign(secret, &payload)?))
}

/// Verify signature and expiry, returning the claims. Any malformed,
/// tampered, or expired token is `Unauthenticated` — the reason is not
/// leaked to the caller.
pub fn verify(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let (payload, signature) = token.split_once('.').ok_or(ApiError::Unauthenticated)?;

    let sig_bytes = hex::decode(signature).map_err(|_| ApiError::Unauthenticated)?;
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    // constant-time comparison
    mac.verify_slice(&sig_bytes)
        .map_err(|_| ApiError::Unauthenticated)?;

    let claims_json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ApiError::Unauthenticated)?;
    let claims: Claims =
        serde_json::from_slice(&claims_json).map_err(|_| ApiError::Unauthenticated)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(ApiError::Unauthenticated);
    }
    Ok(claims)
}

fn mac(secret: &str) -> Result<HmacSha256, ApiError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("bad token secret: {e}")))
}

fn sign(secret: &str, payload: &str) -> Result<String, ApiError> {
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
