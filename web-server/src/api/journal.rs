// web-server/src/api/journal.rs
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::backend::BackendClient;
use crate::session::authenticated_user;
use common::models::plant::project_plants;
use common::Config;

const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    #[serde(default)]
    entry_date: Option<String>,
    #[serde(default)]
    narrative: Option<String>,
    #[serde(default)]
    temperature: Option<serde_json::Value>,
    #[serde(default)]
    humidity: Option<serde_json::Value>,
    #[serde(default)]
    nutrient_mix: Option<serde_json::Value>,
    #[serde(default)]
    ph_level: Option<serde_json::Value>,
    #[serde(default)]
    featured_media_id: Option<serde_json::Value>,
    #[serde(default)]
    plant_id: Option<String>,
}

/// The backend stores entry dates as "YYYY-MM-DD HH:MM:SS"
fn normalize_entry_date(raw: Option<&str>, now: NaiveDateTime) -> String {
    if let Some(raw) = raw {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return parsed.naive_utc().format(ENTRY_DATE_FORMAT).to_string();
        }
        let date_part = raw.get(..10).unwrap_or(raw);
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return format!("{} 00:00:00", date.format("%Y-%m-%d"));
        }
    }
    now.format(ENTRY_DATE_FORMAT).to_string()
}

/// Clients send structured readings as numbers or strings interchangeably
fn numeric(value: &Option<serde_json::Value>) -> Option<f64> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

fn integer(value: &Option<serde_json::Value>) -> Option<i64> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

#[post("/journal-entry/add")]
pub async fn add_entry(
    req: HttpRequest,
    body: web::Json<AddEntryRequest>,
    backend: web::Data<BackendClient>,
    config: web::Data<Config>,
) -> impl Responder {
    let user = match authenticated_user(&req, config.jwt_secret.as_bytes()) {
        Some(user) => user,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" })),
    };

    let has_date = body.entry_date.as_deref().is_some_and(|d| !d.is_empty());
    let has_narrative = body.narrative.as_deref().is_some_and(|n| !n.is_empty());
    if !has_date && !has_narrative {
        return HttpResponse::BadRequest().json(json!({
            "error": "At least date or narrative required"
        }));
    }

    let plant_id = match body.plant_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Plant ID is required"
            }));
        }
    };

    // Denormalize the plant's display name into the entry title via the same
    // projection the dashboard uses
    let plant_name = match backend.list_entries(user.sub).await {
        Ok(entries) => project_plants(entries.iter().map(|entry| entry.observation()))
            .into_iter()
            .find(|plant| plant.id == plant_id)
            .map(|plant| plant.name),
        Err(e) => {
            tracing::warn!("Plant lookup failed: {}", e);
            None
        }
    }
    .unwrap_or_else(|| "Unknown Plant".to_string());

    let now = Utc::now().naive_utc();
    let entry_date = normalize_entry_date(body.entry_date.as_deref(), now);
    let date_label = body
        .entry_date
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Today".to_string());

    let mut entry = json!({
        "title": format!("{} - Entry - {}", plant_name, date_label),
        "status": "publish",
        "author": user.sub,
        "content": body.narrative.clone().unwrap_or_default(),
        "acf": {
            "plant_id": plant_id,
            "plant_name": plant_name,
            "entry_date": entry_date,
            "entry_type": "observation",
            "author_type": "user",
            "temperature_fahrenheit": numeric(&body.temperature),
            "humidity_percent": numeric(&body.humidity),
            "nutrient_mix": body.nutrient_mix.as_ref().and_then(|v| v.as_str()),
            "ph_level": numeric(&body.ph_level),
        },
    });

    if let Some(media_id) = integer(&body.featured_media_id) {
        entry["featured_media"] = json!(media_id);
    }

    match backend.create_entry(&entry).await {
        Ok(created) => {
            tracing::info!("User {} added journal entry {}", user.sub, created.id);
            HttpResponse::Ok().json(json!({ "success": true, "entryId": created.id }))
        }
        Err(e) => {
            tracing::error!("Failed to save journal entry: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to save journal entry"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 26)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_normalize_entry_date_rfc3339() {
        let normalized = normalize_entry_date(Some("2026-08-16T12:30:45Z"), now());
        assert_eq!(normalized, "2026-08-16 12:30:45");
    }

    #[test]
    fn test_normalize_entry_date_plain_date() {
        let normalized = normalize_entry_date(Some("2026-08-16"), now());
        assert_eq!(normalized, "2026-08-16 00:00:00");
    }

    #[test]
    fn test_normalize_entry_date_missing_uses_now() {
        let normalized = normalize_entry_date(None, now());
        assert_eq!(normalized, "2026-08-26 14:30:00");
    }

    #[test]
    fn test_numeric_accepts_strings_and_numbers() {
        assert_eq!(numeric(&Some(json!(6.5))), Some(6.5));
        assert_eq!(numeric(&Some(json!("6.5"))), Some(6.5));
        assert_eq!(numeric(&Some(json!("not a number"))), None);
        assert_eq!(numeric(&None), None);
    }

    #[test]
    fn test_integer_accepts_strings_and_numbers() {
        assert_eq!(integer(&Some(json!(17))), Some(17));
        assert_eq!(integer(&Some(json!("17"))), Some(17));
        assert_eq!(integer(&Some(json!(""))), None);
    }
}
