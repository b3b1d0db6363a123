// web-server/src/session.rs
//
// Session store adapter: reads/writes the signed session token from/to the
// browser cookie. Purely transport; validation is the token codec's job.
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use common::models::session::TokenClaims;
use common::verify_token;

/// Cookie name for the session token
pub const SESSION_COOKIE_NAME: &str = "growbuttler_auth";
/// Cookie max age in seconds (7 days)
pub const COOKIE_MAX_AGE: i64 = 7 * 24 * 60 * 60;

/// Build the session cookie carrying a freshly minted token
pub fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, token)
        .path("/")
        .secure(production)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(COOKIE_MAX_AGE))
        .finish()
}

/// Empty cookie that clears the session on the client
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

/// Raw session token from the request, if any
pub fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Resolve the authenticated user for this request, or None when the cookie
/// is absent, malformed or expired
pub fn authenticated_user(req: &HttpRequest, secret: &[u8]) -> Option<TokenClaims> {
    let token = session_token(req)?;
    verify_token(&token, secret)
}
