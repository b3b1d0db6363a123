// web-server/src/auth.rs
//
// Credential verifier: checks a login/password pair against the content
// backend's authentication endpoint and maps the response to an internal
// identity record. Two phases: the primary auth call decides success, an
// optional profile lookup enriches first/last name and degrades silently.
use crate::backend::BackendClient;
use common::models::session::IdentityRecord;
use serde::Deserialize;

const DEFAULT_ROLE: &str = "subscriber";

/// Payload of the JWT the backend embeds in its auth success envelope
#[derive(Debug, Deserialize)]
struct EmbeddedClaims {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    username: Option<String>,
}

/// Decode the payload segment of the backend-issued JWT without verifying
/// its signature; we only trust it because it arrived over the backend's
/// authenticated success envelope.
fn decode_jwt_payload(jwt: &str) -> Option<EmbeddedClaims> {
    let payload = jwt.split('.').nth(1)?;
    let bytes = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The backend serializes the user id as either a number or a string
fn claim_id(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Verify credentials against the backend. Any failure mode (non-2xx,
/// malformed envelope, missing embedded token) is a verification failure,
/// never an error; callers translate None uniformly to a 401.
pub async fn verify_credentials(
    backend: &BackendClient,
    email: &str,
    password: &str,
) -> Option<IdentityRecord> {
    let response = match backend.authenticate(email, password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Backend authentication failed: {}", e);
            return None;
        }
    };

    if !response.success {
        tracing::warn!("Backend rejected credentials");
        return None;
    }

    let jwt = match response.data {
        Some(data) => data.jwt,
        None => {
            tracing::warn!("Auth envelope missing embedded token");
            return None;
        }
    };

    let claims = decode_jwt_payload(&jwt)?;
    let id = claims.id.as_ref().and_then(claim_id)?;
    let name = claims.username.unwrap_or_else(|| email.to_string());

    let mut identity = IdentityRecord::new(id, name, vec![DEFAULT_ROLE.to_string()]);

    // Best-effort enrichment; the cheap auth path is never blocked by the
    // optional profile lookup
    match backend.fetch_user(id).await {
        Ok(user) => {
            identity.first_name = non_empty(user.first_name);
            identity.last_name = non_empty(user.last_name);
            if let Some(roles) = user.roles {
                if !roles.is_empty() {
                    identity.roles = roles;
                }
            }
        }
        Err(e) => {
            tracing::debug!("Profile enrichment skipped: {}", e);
        }
    }

    Some(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let encoded = base64::encode_config(payload.to_string(), base64::URL_SAFE_NO_PAD);
        format!("header.{}.signature", encoded)
    }

    #[test]
    fn test_decode_payload_string_id() {
        let token = token_with_payload(&serde_json::json!({
            "id": "42",
            "username": "grower"
        }));

        let claims = decode_jwt_payload(&token).expect("payload should decode");
        assert_eq!(claims.id.as_ref().and_then(claim_id), Some(42));
        assert_eq!(claims.username.as_deref(), Some("grower"));
    }

    #[test]
    fn test_decode_payload_numeric_id() {
        let token = token_with_payload(&serde_json::json!({ "id": 7 }));

        let claims = decode_jwt_payload(&token).expect("payload should decode");
        assert_eq!(claims.id.as_ref().and_then(claim_id), Some(7));
        assert!(claims.username.is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_token() {
        assert!(decode_jwt_payload("no-segments").is_none());
        assert!(decode_jwt_payload("a.!!!not-base64!!!.c").is_none());
    }

    #[test]
    fn test_non_empty_filters_blank_enrichment() {
        assert_eq!(non_empty(Some("Gro".to_string())).as_deref(), Some("Gro"));
        assert!(non_empty(Some(String::new())).is_none());
        assert!(non_empty(None).is_none());
    }
}
