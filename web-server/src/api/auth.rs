// web-server/src/api/auth.rs
use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::auth::verify_credentials;
use crate::backend::BackendClient;
use crate::email::{EmailTemplate, Mailer};
use crate::session::{clear_session_cookie, session_cookie};
use common::{create_token, Config};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[post("/auth/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
) -> impl Responder {
    let (email, password) = match (&body.email, &body.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email.clone(), password.clone())
        }
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Email and password are required"
            }));
        }
    };

    // Generic 401 on failure; never reveal which of email/password was wrong
    let identity = match verify_credentials(&backend, &email, &password).await {
        Some(identity) => identity,
        None => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid email or password"
            }));
        }
    };

    match create_token(&identity, &email, config.jwt_secret.as_bytes()) {
        Ok(token) => {
            tracing::info!("User {} logged in", identity.id);

            HttpResponse::Ok()
                .cookie(session_cookie(token, config.is_production()))
                .json(json!({
                    "success": true,
                    "user": {
                        "id": identity.id,
                        "email": email,
                        "name": identity.name,
                        "roles": identity.roles,
                    }
                }))
        }
        Err(e) => {
            tracing::error!("Failed to mint session token: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Login failed. Please try again."
            }))
        }
    }
}

#[post("/auth/logout")]
pub async fn logout() -> impl Responder {
    // The cookie is the session; clearing it is the whole logout. There is
    // no server-side revocation, so other devices keep their sessions until
    // expiry (known limitation).
    HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(json!({
            "success": true,
            "message": "Logged out successfully"
        }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    template_type: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[post("/auth/send-email")]
pub async fn send_email(
    body: web::Json<SendEmailRequest>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    let (to, subject, template_type) = match (&body.to, &body.subject, &body.template_type) {
        (Some(to), Some(subject), Some(template)) => (to, subject, template),
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Missing required fields: to, subject, templateType"
            }));
        }
    };

    let template = match EmailTemplate::parse(template_type) {
        Some(template) => template,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Unknown template type"
            }));
        }
    };

    let data = body.data.clone().unwrap_or_else(|| json!({}));
    let outcome = mailer.send(to, subject, template, &data).await;

    if outcome.success {
        HttpResponse::Ok().json(json!({
            "success": true,
            "mocked": outcome.mocked,
        }))
    } else {
        HttpResponse::InternalServerError().json(json!({
            "error": outcome.error.unwrap_or_else(|| "Failed to send email".to_string())
        }))
    }
}
