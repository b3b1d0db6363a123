// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

// Development fallback only. Running production with this value is a
// deployment mistake, not a supported configuration.
const DEV_JWT_SECRET: &str = "growbuttler_super_secret_jwt_key_2026_change_in_prod";

/// Central configuration for the web server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,

    /// Base URL of the headless content backend (WordPress REST API)
    pub backend_url: String,
    /// Service account used for privileged backend calls
    pub service_username: String,
    /// Application password for the service account
    pub service_password: String,

    /// Symmetric secret for session token signing
    pub jwt_secret: String,

    #[serde(default)]
    pub resend_api_key: Option<String>,
    #[serde(default)]
    pub email_from: Option<String>,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Public base URL used for absolute links in outbound emails
    pub public_base_url: String,

    #[serde(default = "default_run_mode")]
    pub run_mode: String,

    // Static file serving configuration
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    pub path: String,
    pub index: String,
}

fn default_run_mode() -> String {
    env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string())
}

fn default_admin_email() -> String {
    "felix@felixseeger.de".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            service_username: String::new(),
            service_password: String::new(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            resend_api_key: None,
            email_from: None,
            admin_email: default_admin_email(),
            public_base_url: "https://growbuttler.felixseeger.de".to_string(),
            run_mode: default_run_mode(),
            static_files: StaticFilesConfig {
                path: "./static".to_string(),
                index: "index.html".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        // Build configuration
        let config = ConfigFile::builder()
            // Start with defaults
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add environment specific config
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Add a local config file for local overrides
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables with prefix "APP"
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Build and deserialize
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (backward compatibility)
    pub fn from_env() -> Self {
        // Try to load from file first
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let web_server_addr = env::var("WEB_SERVER_ADDR")
                    .unwrap_or_else(|_| "127.0.0.1:8081".to_string());

                let backend_url = env::var("BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string());

                let service_username = env::var("WORDPRESS_USERNAME").unwrap_or_default();

                let service_password = env::var("APPLICATION_PASSWORD").unwrap_or_default();

                let jwt_secret =
                    env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());

                let resend_api_key = env::var("RESEND_API_KEY").ok();

                let email_from = env::var("EMAIL_FROM").ok();

                let admin_email =
                    env::var("ADMIN_EMAIL").unwrap_or_else(|_| default_admin_email());

                let public_base_url = env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "https://growbuttler.felixseeger.de".to_string());

                let static_files_path =
                    env::var("STATIC_FILES_PATH").unwrap_or_else(|_| "./static".to_string());

                let static_files_index =
                    env::var("STATIC_FILES_INDEX").unwrap_or_else(|_| "index.html".to_string());

                Self {
                    web_server_addr,
                    backend_url,
                    service_username,
                    service_password,
                    jwt_secret,
                    resend_api_key,
                    email_from,
                    admin_email,
                    public_base_url,
                    run_mode: default_run_mode(),
                    static_files: StaticFilesConfig {
                        path: static_files_path,
                        index: static_files_index,
                    },
                }
            }
        }
    }

    /// Whether the server is running in a production deployment
    pub fn is_production(&self) -> bool {
        self.run_mode == "production"
    }
}
