// common/src/utils.rs
use crate::models::session::{IdentityRecord, TokenClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Session lifetime: 7 days
pub const SESSION_TTL_SECONDS: usize = 7 * 24 * 60 * 60;

/// Setup tracing for consistent logging
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

/// Mint a signed session token for a verified identity
pub fn create_token(
    identity: &IdentityRecord,
    email: &str,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = now_secs();

    let claims = TokenClaims {
        sub: identity.id,
        email: email.to_string(),
        name: identity.name.clone(),
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        roles: identity.roles.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECONDS,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Validate signature and expiry. Any failure (bad signature, malformed
/// payload, expired) yields None; the caller decides the user-facing
/// consequence.
pub fn verify_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityRecord {
        IdentityRecord {
            id: 42,
            name: "grower".to_string(),
            first_name: Some("Gro".to_string()),
            last_name: Some("Wer".to_string()),
            roles: vec!["subscriber".to_string()],
        }
    }

    #[test]
    fn test_round_trip() {
        let token = create_token(&identity(), "grower@example.com", b"secret").unwrap();
        let claims = verify_token(&token, b"secret").expect("token should verify");

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "grower@example.com");
        assert_eq!(claims.name, "grower");
        assert_eq!(claims.first_name.as_deref(), Some("Gro"));
        assert_eq!(claims.roles, vec!["subscriber".to_string()]);
        assert_eq!(claims.exp, claims.iat + SESSION_TTL_SECONDS);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&identity(), "grower@example.com", b"secret").unwrap();
        assert!(verify_token(&token, b"other_secret").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Sign an already-expired token directly
        let now = now_secs();
        let claims = TokenClaims {
            sub: 42,
            email: "grower@example.com".to_string(),
            name: "grower".to_string(),
            first_name: None,
            last_name: None,
            roles: vec![],
            iat: now - SESSION_TTL_SECONDS - 60,
            exp: now - 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token(&token, b"secret").is_none());
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(verify_token("not-a-token", b"secret").is_none());
        assert!(verify_token("", b"secret").is_none());
    }
}
