// web-server/src/api/experts.rs
use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use futures_util::StreamExt as _;
use serde_json::json;

use crate::backend::{BackendClient, BackendError};
use crate::email::{EmailTemplate, Mailer};
use common::Config;

const PORTFOLIO_FIELD: &str = "portfolioImages";

/// List fields arrive either as a JSON array string or as a plain
/// comma-separated string; the backend meta wants the latter
fn csv(raw: &str) -> String {
    serde_json::from_str::<Vec<String>>(raw)
        .map(|values| values.join(","))
        .unwrap_or_else(|_| raw.to_string())
}

/// Expert marketplace application: creates a pending backend account,
/// attaches the application as user meta, and notifies both the applicant
/// and the admin by email.
#[post("/experts/apply")]
pub async fn apply(
    mut payload: Multipart,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut portfolio_count: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                tracing::warn!("Malformed multipart payload: {}", e);
                return HttpResponse::BadRequest().json(json!({
                    "error": "Invalid multipart payload"
                }));
            }
        };

        let name = field.name().to_string();

        if name == PORTFOLIO_FIELD {
            // Only the count of portfolio images is recorded; the files
            // themselves are reviewed out of band
            portfolio_count += 1;
            while field.next().await.is_some() {}
            continue;
        }

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => value.extend_from_slice(&data),
                Err(e) => {
                    tracing::error!("Failed to read form field {}: {}", name, e);
                    return HttpResponse::InternalServerError().json(json!({
                        "error": "Failed to read application form"
                    }));
                }
            }
        }

        fields.insert(name, String::from_utf8_lossy(&value).into_owned());
    }

    let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

    let name = get("name");
    let email = get("email");
    let password = get("password");

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields"
        }));
    }

    // Pending applicants get a dedicated role until approval
    let new_user = json!({
        "username": email,
        "name": name,
        "email": email,
        "password": password,
        "roles": ["expert_applicant"],
    });

    let user = match backend.create_user(&new_user).await {
        Ok(user) => user,
        Err(BackendError::Status {
            status, message, ..
        }) => {
            let error = message.unwrap_or_else(|| "Failed to create user account".to_string());
            tracing::warn!("Expert application rejected by backend ({}): {}", status, error);

            let status = StatusCode::from_u16(status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return HttpResponse::build(status).json(json!({ "error": error }));
        }
        Err(e) => {
            tracing::error!("Expert application backend call failed: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }
    };

    let location = get("location");
    let years_experience = get("yearsExperience");
    let specialization = csv(&get("specialization"));
    let service_rate = get("serviceRate");
    let available_times = csv(&get("availableTimes"));

    let meta = json!({
        "phone": get("phone"),
        "location": location,
        "specialization": specialization,
        "bio": get("bio"),
        "years_experience": years_experience,
        "certifications": get("certifications"),
        "previous_clients": get("previousClients"),
        "preferred_methods": csv(&get("preferredMethods")),
        "service_rate": service_rate,
        "success_stories": get("successStories"),
        "available_interview_times": available_times,
        "application_status": "pending_review",
        "application_date": Utc::now().to_rfc3339(),
        "portfolio_image_count": portfolio_count,
    });

    // Metadata storage is best-effort; the account already exists
    if let Err(e) = backend.update_user_meta(user.id, &meta).await {
        tracing::error!("Failed to store expert application metadata: {}", e);
    }

    let application_date = Utc::now().format("%d.%m.%Y").to_string();

    mailer.send_detached(
        email.clone(),
        "Expert Application Received - GrowButtler".to_string(),
        EmailTemplate::ExpertApplicationReceived,
        json!({ "name": name, "applicationDate": application_date }),
    );

    mailer.send_detached(
        config.admin_email.clone(),
        format!("New Expert Application: {} ({})", name, location),
        EmailTemplate::ExpertApplicationAdmin,
        json!({
            "applicantName": name,
            "applicantEmail": email,
            "location": location,
            "experience": years_experience,
            "specializations": specialization,
            "serviceRate": service_rate,
            "availableInterviewTimes": available_times,
            "portfolioImagesCount": portfolio_count.to_string(),
        }),
    );

    tracing::info!("Expert application submitted for account {}", user.id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "user": {
            "id": user.id,
            "email": email,
            "name": name,
            "status": "pending_review",
        },
        "message": "Application submitted successfully. Check your email for confirmation.",
    }))
}
