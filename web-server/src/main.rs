// Web Server - main.rs
use actix_web::{web, App, HttpServer};
use common::{setup_tracing, Config};
use web_server::api;
use web_server::backend::BackendClient;
use web_server::email::Mailer;
use web_server::middleware::auth_guard::RouteGuard;
use web_server::static_files::{self, StaticFiles};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    tracing::info!("Starting GrowButtler web server on {}", server_addr);

    // Pages behind these prefixes require a valid session cookie
    let guard = RouteGuard::new(
        vec![
            "/dashboard".to_string(),
            "/settings".to_string(),
            "/journal".to_string(),
        ],
        &config.jwt_secret,
    );

    let backend = web::Data::new(BackendClient::new(&config));
    let mailer = web::Data::new(Mailer::new(&config));
    let static_config = StaticFiles::from_config(&config.static_files);
    let config_data = web::Data::new(config);

    // Start HTTP server
    HttpServer::new(move || {
        let static_config = static_config.clone();

        App::new()
            .app_data(config_data.clone())
            .app_data(backend.clone())
            .app_data(mailer.clone())
            .wrap(guard.clone())
            .configure(api::configure)
            .configure(move |cfg| static_files::configure(cfg, static_config))
    })
    .bind(&server_addr)?
    .run()
    .await
}
