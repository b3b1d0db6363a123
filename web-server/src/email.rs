// web-server/src/email.rs
//
// Notification dispatcher: renders a fixed set of transactional templates
// and hands them to the Resend HTTP API. Send failures are reported in the
// outcome value, never raised; callers on a primary request path spawn the
// send detached and only log the outcome.
use common::Config;
use serde::Deserialize;
use std::time::Duration;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const MAIL_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FROM: &str = "GrowButtler <onboarding@resend.dev>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    Welcome,
    ExpertApplicationReceived,
    ExpertApplicationAdmin,
    ExpertApproved,
}

impl EmailTemplate {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "welcome" => Some(EmailTemplate::Welcome),
            "expert_application_received" => Some(EmailTemplate::ExpertApplicationReceived),
            "expert_application_admin" => Some(EmailTemplate::ExpertApplicationAdmin),
            "expert_approved" => Some(EmailTemplate::ExpertApproved),
            _ => None,
        }
    }
}

/// Outcome of a dispatch attempt. `mocked` is set when no API key is
/// configured and the message was only logged.
#[derive(Debug, Clone)]
pub struct EmailOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub mocked: bool,
}

impl EmailOutcome {
    fn sent() -> Self {
        Self {
            success: true,
            error: None,
            mocked: false,
        }
    }

    fn mocked() -> Self {
        Self {
            success: true,
            error: None,
            mocked: true,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            mocked: false,
        }
    }
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
    public_base_url: String,
    backend_url: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(MAIL_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            endpoint: RESEND_ENDPOINT.to_string(),
            api_key: config.resend_api_key.clone(),
            from: config
                .email_from
                .clone()
                .unwrap_or_else(|| DEFAULT_FROM.to_string()),
            public_base_url: config.public_base_url.clone(),
            backend_url: config.backend_url.clone(),
        }
    }

    /// Point the dispatcher at a different transport endpoint (tests,
    /// self-hosted relays)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn render(&self, template: EmailTemplate, data: &serde_json::Value) -> (String, String) {
        let base_url = &self.public_base_url;
        let field = |key: &str| data[key].as_str().unwrap_or("").to_string();

        match template {
            EmailTemplate::Welcome => {
                let name = field("name");
                (
                    format!(
                        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\
                         <h1 style=\"color: #13ec3b;\">Welcome to GrowButtler, {name}!</h1>\
                         <p>Your account has been created successfully.</p>\
                         <p>You can now access your cultivation journal, find expert mentors, and track your plants.</p>\
                         <p><a href=\"{base_url}/dashboard\">Go to Dashboard</a></p>\
                         <p>Happy growing!<br/>The GrowButtler Team</p>\
                         </div>"
                    ),
                    format!(
                        "Welcome to GrowButtler, {name}!\n\nYour account has been created successfully.\n\nGo to: {base_url}/dashboard"
                    ),
                )
            }
            EmailTemplate::ExpertApplicationReceived => {
                let name = field("name");
                let date = field("applicationDate");
                (
                    format!(
                        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\
                         <h1 style=\"color: #13ec3b;\">Application Received</h1>\
                         <p>Dear {name},</p>\
                         <p>Thank you for applying to become a master grower on GrowButtler!</p>\
                         <p>We received your application on {date}. Our team is reviewing your portfolio now.</p>\
                         <p><strong>Next Step:</strong> We will contact you shortly to schedule your mandatory video interview.</p>\
                         <p><a href=\"{base_url}/login\">Check Status</a></p>\
                         <p>Best regards,<br/>The GrowButtler Team</p>\
                         </div>"
                    ),
                    format!(
                        "Dear {name},\n\nThank you for applying to become a master grower on GrowButtler!\n\nWe received your application on {date}. Next step: video interview.\n\nCheck status: {base_url}/login"
                    ),
                )
            }
            EmailTemplate::ExpertApplicationAdmin => {
                let name = field("applicantName");
                let email = field("applicantEmail");
                let location = field("location");
                let experience = field("experience");
                let specializations = field("specializations");
                let rate = field("serviceRate");
                let times = field("availableInterviewTimes");
                let portfolio = field("portfolioImagesCount");
                let backend_url = &self.backend_url;
                (
                    format!(
                        "<div style=\"font-family: sans-serif; padding: 20px;\">\
                         <h2>New Expert Application</h2>\
                         <p><strong>Name:</strong> {name}</p>\
                         <p><strong>Email:</strong> {email}</p>\
                         <p><strong>Location:</strong> {location}</p>\
                         <p><strong>Experience:</strong> {experience}</p>\
                         <p><strong>Specializations:</strong> {specializations}</p>\
                         <p><strong>Rate:</strong> &euro;{rate}/hr</p>\
                         <p><strong>Available for Interview:</strong> {times}</p>\
                         <p><strong>Portfolio:</strong> {portfolio} images</p>\
                         <hr/>\
                         <a href=\"{backend_url}/wp-admin/users.php\">Review in WordPress</a>\
                         </div>"
                    ),
                    format!(
                        "New Expert Application: {name} ({location}). Review: {backend_url}/wp-admin/users.php"
                    ),
                )
            }
            EmailTemplate::ExpertApproved => {
                let name = field("name");
                let expert_id = field("expertId");
                (
                    format!(
                        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\
                         <h1 style=\"color: #13ec3b;\">Welcome to the Expert Network!</h1>\
                         <p>Dear {name},</p>\
                         <p>Congratulations! Your expert application has been approved.</p>\
                         <p>Your profile is now live and visible to growers looking for mentorship.</p>\
                         <p><a href=\"{base_url}/expert/{expert_id}\">View Your Profile</a></p>\
                         <p>Best regards,<br/>The GrowButtler Team</p>\
                         </div>"
                    ),
                    format!(
                        "Congratulations! Your expert application has been approved.\n\nYour profile is now live: {base_url}/expert/{expert_id}"
                    ),
                )
            }
        }
    }

    /// Render and dispatch one message. Never panics; transport and API
    /// failures come back in the outcome.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        template: EmailTemplate,
        data: &serde_json::Value,
    ) -> EmailOutcome {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                tracing::info!("Email mock (no API key): to={} subject={}", to, subject);
                return EmailOutcome::mocked();
            }
        };

        let (html, text) = self.render(template, data);

        let body = serde_json::json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
            "text": text,
        });

        let result = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => EmailOutcome::sent(),
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                tracing::error!("Mail provider rejected send: {} {}", status, detail);
                EmailOutcome::failed(format!("mail provider returned {}", status))
            }
            Err(e) => {
                tracing::error!("Mail transport error: {}", e);
                EmailOutcome::failed(e.to_string())
            }
        }
    }

    /// Fire-and-forget send for non-critical notifications. The caller's
    /// response never waits on this; failures are logged and dropped.
    pub fn send_detached(
        &self,
        to: String,
        subject: String,
        template: EmailTemplate,
        data: serde_json::Value,
    ) {
        let mailer = self.clone();
        actix_web::rt::spawn(async move {
            let outcome = mailer.send(&to, &subject, template, &data).await;
            if !outcome.success {
                tracing::error!(
                    "Detached email failed: to={} subject={} error={:?}",
                    to,
                    subject,
                    outcome.error
                );
            }
        });
    }
}
