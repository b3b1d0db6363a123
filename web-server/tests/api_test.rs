// tests/api_test.rs
//
// Handler-contract tests. Validation and session-policy paths run without
// a reachable content backend: every asserted path must settle before any
// outbound call would be made. Backend-dependent paths run against a local
// in-process stand-in spun up per test.
use actix_web::http::header;
use actix_web::{test, web, App, HttpResponse, HttpServer};
use serde_json::json;

use common::Config;
use web_server::api;
use web_server::backend::BackendClient;
use web_server::email::Mailer;
use web_server::session::SESSION_COOKIE_NAME;

fn test_config() -> Config {
    Config {
        // Nothing listens here; reaching the backend in these tests is a bug
        backend_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    }
}

/// Serve a stand-in content backend on an ephemeral port and return its
/// base URL. The server lives until the test runtime shuts down.
fn spawn_backend(routes: fn(&mut web::ServiceConfig)) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stand-in backend");
    let addr = listener.local_addr().expect("stand-in backend address");

    let server = HttpServer::new(move || App::new().configure(routes))
        .listen(listener)
        .expect("listen on stand-in backend")
        .workers(1)
        .run();
    actix_web::rt::spawn(server);

    format!("http://{}", addr)
}

fn conflicting_user_backend(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/wp-json/wp/v2/users",
        web::post().to(|| async {
            HttpResponse::BadRequest().json(json!({
                "code": "existing_user_email",
                "message": "Sorry, that email address is already used!"
            }))
        }),
    );
}

fn accepting_user_backend(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/wp-json/wp/v2/users",
        web::post().to(|| async {
            HttpResponse::Created().json(json!({
                "id": 7,
                "name": "Gro Wer",
                "email": "grower@example.com",
                "first_name": "Gro",
                "last_name": "Wer",
                "roles": ["subscriber"]
            }))
        }),
    );
}

macro_rules! init_app {
    () => {{
        let config = test_config();
        test::init_service(
            App::new()
                .app_data(web::Data::new(BackendClient::new(&config)))
                .app_data(web::Data::new(Mailer::new(&config)))
                .app_data(web::Data::new(config))
                .configure(api::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_logout_clears_session_cookie() {
    let app = init_app!();

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .expect("logout should set a clearing cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_login_requires_email_and_password() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "grower@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_signup_requires_all_fields() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({ "firstName": "Gro", "email": "grower@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_signup_conflict_passes_status_through_without_cookie() {
    let config = Config {
        backend_url: spawn_backend(conflicting_user_backend),
        ..Config::default()
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(BackendClient::new(&config)))
            .app_data(web::Data::new(Mailer::new(&config)))
            .app_data(web::Data::new(config))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({
            "firstName": "Gro",
            "lastName": "Wer",
            "email": "grower@example.com",
            "password": "hunter22"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Conflict keeps the backend's status; no session is minted on failure
    assert_eq!(resp.status().as_u16(), 400);
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != SESSION_COOKIE_NAME));

    let body: serde_json::Value = test::read_body_json(resp).await;
    let error = body["error"].as_str().expect("error message");
    assert!(error.contains("already exists"));
    assert!(error.contains("log in instead"));
}

#[actix_web::test]
async fn test_signup_succeeds_when_welcome_email_fails() {
    let config = Config {
        backend_url: spawn_backend(accepting_user_backend),
        resend_api_key: Some("re_test_key".to_string()),
        ..Config::default()
    };
    // Real API key but an unreachable mail transport: the detached welcome
    // send fails, and the signup response must not notice
    let mailer = Mailer::new(&config).with_endpoint("http://127.0.0.1:1");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(BackendClient::new(&config)))
            .app_data(web::Data::new(mailer))
            .app_data(web::Data::new(config))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({
            "firstName": "Gro",
            "lastName": "Wer",
            "email": "grower@example.com",
            "password": "hunter22"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .expect("signup should mint a session cookie");
    assert!(!session.is_empty());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], 7);
    assert_eq!(body["user"]["firstName"], "Gro");
}

#[actix_web::test]
async fn test_list_plants_requires_session() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/plants").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_web::test]
async fn test_add_journal_entry_requires_session() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/journal-entry/add")
        .set_json(json!({ "narrative": "looking healthy", "plantId": "plant-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_web::test]
async fn test_send_email_requires_fields() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/send-email")
        .set_json(json!({ "to": "grower@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_send_email_rejects_unknown_template() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/send-email")
        .set_json(json!({
            "to": "grower@example.com",
            "subject": "Hi",
            "templateType": "newsletter"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_upload_rejects_non_image_before_any_backend_call() {
    let app = init_app!();

    let boundary = "XUPLOADBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    // 400 from validation; an attempted backend call would have produced a
    // 500 since nothing listens on the configured address
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = init_app!();

    let boundary = "XUPLOADBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         no file here\r\n\
         --{boundary}--\r\n"
    );

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}
