// common/src/models/session.rs
use serde::{Deserialize, Serialize};

/// Claims carried by the session cookie. The cookie *is* the session; the
/// server keeps no session store of its own, so everything a request needs
/// to know about the authenticated user lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Backend user id
    pub sub: i64,
    pub email: String,
    /// Display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    /// Issued at (seconds since epoch)
    pub iat: usize,
    /// Expiry, always iat + 7 days
    pub exp: usize,
}

/// Result of verifying a login/password pair against the content backend.
/// Ephemeral: constructed once per login/signup call and discarded after the
/// session token is minted.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub id: i64,
    pub name: String,
    /// Enrichment from the backend user-detail endpoint; stays unset when
    /// the secondary lookup fails.
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
}

impl IdentityRecord {
    pub fn new(id: i64, name: String, roles: Vec<String>) -> Self {
        Self {
            id,
            name,
            first_name: None,
            last_name: None,
            roles,
        }
    }
}
