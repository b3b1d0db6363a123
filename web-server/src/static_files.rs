// web-server/src/static_files.rs
//
// Serves the pre-built frontend bundle. All page rendering happens client
// side; this server only hands out the assets and the SPA index fallback.
use actix_files::{Files, NamedFile};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result};
use common::config::StaticFilesConfig;
use std::path::PathBuf;

#[derive(Clone)]
pub struct StaticFiles {
    pub root_path: PathBuf,
    pub index_file: String,
}

impl StaticFiles {
    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self {
            root_path: PathBuf::from(&config.path),
            index_file: config.index.clone(),
        }
    }
}

// Async handler function for SPA fallback
async fn spa_index(req: HttpRequest, config: web::Data<StaticFiles>) -> Result<HttpResponse, Error> {
    // Don't serve index.html for API routes
    if req.path().starts_with("/api/") {
        return Ok(HttpResponse::NotFound().finish());
    }

    // For all other unmatched routes, serve the index file (SPA support)
    let index_path = config.root_path.join(&config.index_file);
    let file = NamedFile::open(index_path)?;
    Ok(file.into_response(&req))
}

// Configure static file serving with SPA support
pub fn configure(cfg: &mut web::ServiceConfig, config: StaticFiles) {
    let config_data = web::Data::new(config.clone());

    cfg.app_data(config_data)
        .service(
            Files::new("/", &config.root_path)
                .index_file(&config.index_file)
                .prefer_utf8(true)
                .use_etag(true)
                .use_last_modified(true),
        )
        // Catch-all route for SPA support with the lowest priority
        .default_service(web::route().to(spa_index));
}
