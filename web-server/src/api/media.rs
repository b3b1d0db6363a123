// web-server/src/api/media.rs
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use futures_util::StreamExt as _;
use serde_json::json;

use crate::backend::BackendClient;

fn is_image(content_type: &mime::Mime) -> bool {
    content_type.type_() == mime::IMAGE
}

/// Relay one uploaded image to the backend media endpoint. Non-image
/// uploads are rejected before any network call is made.
#[post("/upload-image")]
pub async fn upload_image(
    mut payload: Multipart,
    backend: web::Data<BackendClient>,
) -> impl Responder {
    let mut file: Option<(String, String, Vec<u8>)> = None;

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

        if field.name() != "file" {
            // Drain unexpected fields so the stream stays consumable
            while field.next().await.is_some() {}
            continue;
        }

        let content_type = match field.content_type() {
            Some(content_type) if is_image(content_type) => content_type.to_string(),
            _ => {
                return HttpResponse::BadRequest().json(json!({
                    "error": "File must be an image"
                }));
            }
        };

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(e) => {
                    tracing::error!("Failed to read upload stream: {}", e);
                    return HttpResponse::InternalServerError().json(json!({
                        "error": "Failed to read upload"
                    }));
                }
            }
        }

        file = Some((filename, content_type, bytes));
        break;
    }

    let Some((filename, content_type, bytes)) = file else {
        return HttpResponse::BadRequest().json(json!({ "error": "No file provided" }));
    };

    match backend.upload_media(&filename, &content_type, bytes).await {
        Ok(media) => HttpResponse::Ok().json(json!({
            "success": true,
            "id": media.id,
            "url": media.source_url,
            "mediaType": "image",
        })),
        Err(e) => {
            tracing::error!("Media upload failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to upload image"
            }))
        }
    }
}
