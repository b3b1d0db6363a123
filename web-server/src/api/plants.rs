// web-server/src/api/plants.rs
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::backend::BackendClient;
use crate::session::authenticated_user;
use crate::utils::token::generate_plant_id;
use common::models::plant::{day_number, project_plants, week_number, GrowthStage};
use common::Config;

/// Dashboard plant list: a read-time projection over the user's journal
/// entries, grouped by plant id
#[get("/plants")]
pub async fn list_plants(
    req: HttpRequest,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
) -> impl Responder {
    let user = match authenticated_user(&req, config.jwt_secret.as_bytes()) {
        Some(user) => user,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" })),
    };

    let entries = match backend.list_entries(user.sub).await {
        Ok(entries) => entries,
        Err(e) => {
            // A failed read degrades to an empty dashboard rather than an
            // error page
            tracing::warn!("Failed to fetch journal entries: {}", e);
            return HttpResponse::Ok().json(json!({ "plants": [] }));
        }
    };

    let plants = project_plants(entries.iter().map(|entry| entry.observation()));

    HttpResponse::Ok().json(json!({ "plants": plants }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlantRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    strain: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
}

/// Accepts plain dates and full timestamps; anything unparseable falls back
/// to today
fn parse_start_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = raw else { return today };
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").unwrap_or(today)
}

#[post("/plants/add")]
pub async fn add_plant(
    req: HttpRequest,
    body: web::Json<AddPlantRequest>,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
) -> impl Responder {
    let user = match authenticated_user(&req, config.jwt_secret.as_bytes()) {
        Some(user) => user,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" })),
    };

    let (name, stage) = match (&body.name, &body.stage) {
        (Some(name), Some(stage)) if !name.is_empty() && !stage.is_empty() => {
            (name.clone(), GrowthStage::parse(stage))
        }
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Name and stage are required"
            }));
        }
    };

    let today = Utc::now().date_naive();
    let start = parse_start_date(body.start_date.as_deref(), today);
    let day = day_number(start, today);
    let week = week_number(day);

    // The backend has no plant entity; the plant exists as soon as its first
    // entry carries this identifier
    let plant_id = generate_plant_id();

    let strain = body.strain.clone().unwrap_or_default();
    let location = body.location.clone().unwrap_or_default();

    let mut content = format!("Started growing {}", name);
    if !strain.is_empty() {
        content.push_str(&format!(" ({})", strain));
    }
    if !location.is_empty() {
        content.push_str(&format!(" in {}", location));
    }
    content.push('.');

    let entry = json!({
        "title": format!("{} - Day 1", name),
        "content": content,
        "status": "publish",
        "author": user.sub,
        "acf": {
            "plant_id": plant_id,
            "plant_name": name,
            "day_number": 1,
            "week_number": 1,
            "stage": stage.as_str(),
            "type": "observation",
            "author_type": "user",
        },
    });

    let created = match backend.create_entry(&entry).await {
        Ok(created) => created,
        Err(e) => {
            tracing::error!("Failed to create plant entry: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to create plant entry"
            }));
        }
    };

    tracing::info!("User {} added plant {}", user.sub, plant_id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "plant": {
            "id": plant_id,
            "name": name,
            "strain": strain,
            "stage": stage.as_str(),
            "location": location,
            "dayNumber": day,
            "weekNumber": week,
            "startDate": start.format("%Y-%m-%d").to_string(),
        },
        "journalEntryId": created.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_date_plain() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let parsed = parse_start_date(Some("2026-08-16"), today);
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 8, 16).unwrap());
    }

    #[test]
    fn test_parse_start_date_timestamp() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let parsed = parse_start_date(Some("2026-08-16T12:30:00Z"), today);
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 8, 16).unwrap());
    }

    #[test]
    fn test_parse_start_date_invalid_falls_back_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        assert_eq!(parse_start_date(Some("soon"), today), today);
        assert_eq!(parse_start_date(None, today), today);
    }
}
