// web-server/src/backend.rs
//
// HTTP client for the headless content backend (WordPress REST API).
// Privileged writes (user creation, content creation, media upload) are
// signed with Basic auth from the configured service account; reads go
// through unauthenticated.
use common::models::plant::PlantObservation;
use common::Config;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

// The backend sits across a trust boundary; never wait on it unbounded.
const BACKEND_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status}")]
    Status {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
}

/// Error envelope the backend uses for rejected writes
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Response envelope of the backend's authentication endpoint
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AuthData>,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub jwt: String,
}

/// Backend user record (full shape on privileged reads)
#[derive(Debug, Deserialize)]
pub struct BackendUser {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedEntry {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UploadedMedia {
    pub id: i64,
    pub source_url: String,
}

/// One journal entry as returned by the backend list endpoint
#[derive(Debug, Deserialize)]
pub struct BackendEntry {
    pub id: i64,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub acf: Option<EntryFields>,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<EmbeddedMedia>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryFields {
    #[serde(default)]
    pub plant_id: Option<String>,
    #[serde(default)]
    pub plant_name: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub day_number: Option<u32>,
    #[serde(default)]
    pub week_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddedMedia {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub source_url: Option<String>,
}

impl BackendEntry {
    /// Pull the plant-projection slice out of the wire format
    pub fn observation(&self) -> PlantObservation {
        let fields = self.acf.as_ref();
        let image_url = self
            .embedded
            .as_ref()
            .and_then(|e| e.featured_media.first())
            .and_then(|m| m.source_url.clone());

        PlantObservation {
            plant_id: fields.and_then(|f| f.plant_id.clone()),
            plant_name: fields.and_then(|f| f.plant_name.clone()),
            stage: fields.and_then(|f| f.stage.clone()),
            day_number: fields.and_then(|f| f.day_number),
            week_number: fields.and_then(|f| f.week_number),
            image_url,
            modified: self.modified.clone(),
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    service_username: String,
    service_password: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            service_username: config.service_username.clone(),
            service_password: config.service_password.clone(),
        }
    }

    /// Basic auth header for privileged calls; application passwords are
    /// pasted with spaces, strip them before encoding
    fn basic_auth(&self) -> String {
        let password: String = self.service_password.split_whitespace().collect();
        let credentials = format!("{}:{}", self.service_username, password);
        format!("Basic {}", base64::encode(credentials))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the `{code, message}` error envelope from a failed response
    async fn status_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body: BackendErrorBody = response.json().await.unwrap_or_default();
        BackendError::Status {
            status,
            code: body.code,
            message: body.message,
        }
    }

    /// Call the backend's authentication endpoint with a login/password pair
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        let response = self
            .http
            .post(self.url("/wp-json/simple-jwt-login/v1/auth"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// User-detail lookup used for profile enrichment
    pub async fn fetch_user(&self, id: i64) -> Result<BackendUser, BackendError> {
        let response = self
            .http
            .get(self.url(&format!("/wp-json/wp/v2/users/{}?context=edit", id)))
            .header("Authorization", self.basic_auth())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Create a backend user (privileged)
    pub async fn create_user(
        &self,
        user: &serde_json::Value,
    ) -> Result<BackendUser, BackendError> {
        let response = self
            .http
            .post(self.url("/wp-json/wp/v2/users"))
            .header("Authorization", self.basic_auth())
            .json(user)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Attach application metadata to a backend user (privileged)
    pub async fn update_user_meta(
        &self,
        id: i64,
        meta: &serde_json::Value,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .patch(self.url(&format!("/wp-json/wp/v2/users/{}", id)))
            .header("Authorization", self.basic_auth())
            .json(&serde_json::json!({ "meta": meta }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(())
    }

    /// All journal entries of one author, newest first, with embedded media
    pub async fn list_entries(&self, author: i64) -> Result<Vec<BackendEntry>, BackendError> {
        let url = self.url(&format!(
            "/wp-json/wp/v2/journal_entries?author={}&per_page=100&orderby=date&order=desc&_embed=wp:featuredmedia",
            author
        ));

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Create a journal entry (privileged)
    pub async fn create_entry(
        &self,
        entry: &serde_json::Value,
    ) -> Result<CreatedEntry, BackendError> {
        let response = self
            .http
            .post(self.url("/wp-json/wp/v2/journal_entries"))
            .header("Authorization", self.basic_auth())
            .json(entry)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Relay raw file bytes to the backend media endpoint, preserving the
    /// original filename
    pub async fn upload_media(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, BackendError> {
        let response = self
            .http
            .post(self.url("/wp-json/wp/v2/media"))
            .header("Authorization", self.basic_auth())
            .header("Content-Type", content_type)
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            )
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(response.json().await?)
    }
}
