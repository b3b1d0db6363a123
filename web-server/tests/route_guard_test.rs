// tests/route_guard_test.rs
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{test, web, App, HttpResponse};

use common::models::session::{IdentityRecord, TokenClaims};
use common::{create_token, SESSION_TTL_SECONDS};
use web_server::middleware::auth_guard::RouteGuard;
use web_server::session::SESSION_COOKIE_NAME;

const SECRET: &str = "test_secret";

fn guard() -> RouteGuard {
    RouteGuard::new(
        vec![
            "/dashboard".to_string(),
            "/settings".to_string(),
            "/journal".to_string(),
        ],
        SECRET,
    )
}

async fn page() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

fn valid_token() -> String {
    let identity = IdentityRecord::new(1, "grower".to_string(), vec!["subscriber".to_string()]);
    create_token(&identity, "grower@example.com", SECRET.as_bytes()).unwrap()
}

#[actix_web::test]
async fn test_unprotected_path_passes_without_cookie() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/experts", web::get().to(page)),
    )
    .await;

    let req = test::TestRequest::get().uri("/experts").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_protected_path_without_cookie_redirects_to_login() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/dashboard", web::get().to(page)),
    )
    .await;

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[actix_web::test]
async fn test_protected_subpath_is_guarded() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/journal/new-entry", web::get().to(page)),
    )
    .await;

    let req = test::TestRequest::get().uri("/journal/new-entry").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
}

#[actix_web::test]
async fn test_protected_path_with_valid_session_passes() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/dashboard", web::get().to(page)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new(SESSION_COOKIE_NAME, valid_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_token_signed_with_other_secret_redirects() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/settings", web::get().to(page)),
    )
    .await;

    let identity = IdentityRecord::new(1, "grower".to_string(), vec![]);
    let token = create_token(&identity, "grower@example.com", b"another_secret").unwrap();

    let req = test::TestRequest::get()
        .uri("/settings")
        .cookie(Cookie::new(SESSION_COOKIE_NAME, token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
}

#[actix_web::test]
async fn test_expired_token_redirects() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/dashboard", web::get().to(page)),
    )
    .await;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = TokenClaims {
        sub: 1,
        email: "grower@example.com".to_string(),
        name: "grower".to_string(),
        first_name: None,
        last_name: None,
        roles: vec![],
        iat: now - SESSION_TTL_SECONDS - 60,
        exp: now - 60,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new(SESSION_COOKIE_NAME, token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
}

#[actix_web::test]
async fn test_garbage_cookie_fails_closed() {
    let app = test::init_service(
        App::new()
            .wrap(guard())
            .route("/dashboard", web::get().to(page)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new(SESSION_COOKIE_NAME, "definitely.not.a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
}
