// web-server/src/api/signup.rs
use actix_web::http::StatusCode;
use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::backend::{BackendClient, BackendError};
use crate::email::{EmailTemplate, Mailer};
use crate::session::session_cookie;
use common::models::session::IdentityRecord;
use common::{create_token, Config};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Translate backend rejection into a user-facing message. Duplicate-account
/// conflicts get a clearer message than the backend's raw one.
fn signup_error_message(code: Option<&str>, message: Option<String>) -> String {
    match code {
        Some("existing_user_login") | Some("existing_user_email") => {
            "An account with this email already exists. Please log in instead.".to_string()
        }
        _ => message.unwrap_or_else(|| "Failed to create account".to_string()),
    }
}

#[post("/signup")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    let (first_name, last_name, email, password) = match (
        &body.first_name,
        &body.last_name,
        &body.email,
        &body.password,
    ) {
        (Some(first), Some(last), Some(email), Some(password))
            if !first.is_empty() && !last.is_empty() && !email.is_empty() && !password.is_empty() =>
        {
            (first.clone(), last.clone(), email.clone(), password.clone())
        }
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Missing required fields"
            }));
        }
    };

    let full_name = format!("{} {}", first_name, last_name).trim().to_string();

    // The backend requires a username; the email doubles as one
    let new_user = json!({
        "username": email,
        "name": full_name,
        "first_name": first_name,
        "last_name": last_name,
        "email": email,
        "password": password,
        "roles": ["subscriber"],
    });

    let user = match backend.create_user(&new_user).await {
        Ok(user) => user,
        Err(BackendError::Status {
            status,
            code,
            message,
        }) => {
            // Conflicts pass the backend's status through; no session is
            // minted on any failure
            let error = signup_error_message(code.as_deref(), message);
            tracing::warn!("Signup rejected by backend ({}): {}", status, error);

            let status = StatusCode::from_u16(status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return HttpResponse::build(status).json(json!({ "error": error }));
        }
        Err(e) => {
            tracing::error!("Signup backend call failed: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error. Please try again."
            }));
        }
    };

    let account_email = if user.email.is_empty() {
        email.clone()
    } else {
        user.email.clone()
    };

    let identity = IdentityRecord {
        id: user.id,
        name: if user.name.is_empty() {
            full_name
        } else {
            user.name.clone()
        },
        first_name: Some(user.first_name.clone().unwrap_or_else(|| first_name.clone())),
        last_name: Some(user.last_name.clone().unwrap_or_else(|| last_name.clone())),
        roles: user
            .roles
            .clone()
            .filter(|roles| !roles.is_empty())
            .unwrap_or_else(|| vec!["subscriber".to_string()]),
    };

    // Auto-login: the fresh account is immediately authenticated
    let token = match create_token(&identity, &account_email, config.jwt_secret.as_bytes()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to mint session token after signup: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error. Please try again."
            }));
        }
    };

    // Welcome email is non-critical; signup never fails if it fails
    mailer.send_detached(
        account_email.clone(),
        "Welcome to GrowButtler!".to_string(),
        EmailTemplate::Welcome,
        json!({ "name": first_name }),
    );

    tracing::info!("Created account {} ({})", identity.id, account_email);

    HttpResponse::Ok()
        .cookie(session_cookie(token, config.is_production()))
        .json(json!({
            "success": true,
            "user": {
                "id": identity.id,
                "email": account_email,
                "name": identity.name,
                "firstName": identity.first_name,
                "lastName": identity.last_name,
            }
        }))
}
