/// Contact form email relay
///
/// Turns a contact form submission into an email to the operator inbox,
/// with the visitor's address as reply-to. Messages go out through a
/// transactional email HTTP API or SMTP (lettre), or are only logged in
/// mock mode.
pub mod resend;
pub mod smtp;
pub mod templates;

use crate::app_config::{RelayConfig, RelayTransport};
use serde::Deserialize;

pub type EmailResult<T> = Result<T, EmailError>;

/// Email relay errors
#[derive(Debug)]
pub enum EmailError {
    /// One or more contact form fields were missing or blank
    MissingFields,
    /// The selected transport has no credentials or host configured
    NotConfigured(&'static str),
    /// An address in the configuration or the form could not be parsed
    Address(String),
    /// Rendering the message body failed
    Template(askama::Error),
    /// The email API answered with a non-success status
    Rejected { status: u16, body: String },
    /// The email API could not be reached
    Http(reqwest::Error),
    /// Email building error
    Build(lettre::error::Error),
    /// SMTP sending error
    Smtp(lettre::transport::smtp::Error),
    /// The blocking SMTP task was cancelled
    Blocking,
}

impl EmailError {
    /// Whether the caller sent a bad request, as opposed to a failure on
    /// our side or the provider's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EmailError::MissingFields)
    }

    /// Message safe to show the visitor
    pub fn public_message(&self) -> &'static str {
        match self {
            EmailError::MissingFields => "All fields are required.",
            EmailError::NotConfigured(_) => "Email service is not configured.",
            EmailError::Rejected { .. } | EmailError::Smtp(_) => "Failed to send the email.",
            _ => "Internal server error.",
        }
    }
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::MissingFields => write!(f, "Missing contact form fields"),
            EmailError::NotConfigured(what) => write!(f, "Email relay not configured: {}", what),
            EmailError::Address(msg) => write!(f, "Invalid address: {}", msg),
            EmailError::Template(e) => write!(f, "Email template error: {}", e),
            EmailError::Rejected { status, body } => {
                write!(f, "Email API rejected message ({}): {}", status, body)
            }
            EmailError::Http(e) => write!(f, "Email API request failed: {}", e),
            EmailError::Build(e) => write!(f, "Email build error: {}", e),
            EmailError::Smtp(e) => write!(f, "Email send error: {}", e),
            EmailError::Blocking => write!(f, "Email send task was cancelled"),
        }
    }
}

impl std::error::Error for EmailError {}

impl From<askama::Error> for EmailError {
    fn from(e: askama::Error) -> Self {
        EmailError::Template(e)
    }
}

impl From<reqwest::Error> for EmailError {
    fn from(e: reqwest::Error) -> Self {
        EmailError::Http(e)
    }
}

impl From<lettre::error::Error> for EmailError {
    fn from(e: lettre::error::Error) -> Self {
        EmailError::Build(e)
    }
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        EmailError::Smtp(e)
    }
}

/// Contact form as posted by the site
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
}

/// A contact request with every field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub project_type: String,
    pub message: String,
}

fn required(field: Option<String>) -> EmailResult<String> {
    match field.map(|f| f.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EmailError::MissingFields),
    }
}

impl ContactRequest {
    pub fn into_message(self) -> EmailResult<ContactMessage> {
        Ok(ContactMessage {
            first_name: required(self.first_name)?,
            last_name: required(self.last_name)?,
            email: required(self.email)?,
            project_type: required(self.project_type)?,
            message: required(self.message)?,
        })
    }
}

/// Sends contact messages with the configured transport
pub struct Relay {
    config: RelayConfig,
    site_name: String,
    client: reqwest::Client,
}

impl Relay {
    pub fn new(config: RelayConfig, site_name: impl Into<String>) -> Self {
        Self {
            config,
            site_name: site_name.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a relay from the global application configuration
    pub fn from_app_config() -> Self {
        let config = crate::app_config::get_config();
        Self::new(config.relay, config.site.name)
    }

    /// Validate and deliver one contact form submission. No retries.
    pub async fn send(&self, request: ContactRequest) -> EmailResult<()> {
        let message = request.into_message()?;
        let subject = templates::contact_subject(&message);

        if self.config.mock {
            log::info!("MOCK CONTACT EMAIL:");
            log::info!("  To: {}", self.config.to);
            log::info!("  Reply-To: {}", message.email);
            log::info!("  Subject: {}", subject);
            return Ok(());
        }

        let html = templates::render_contact_html(&message, &self.site_name)?;
        match self.config.transport {
            RelayTransport::Http => {
                resend::send(&self.client, &self.config, &message, &subject, &html).await
            }
            RelayTransport::Smtp => {
                let text = templates::render_contact_text(&message, &self.site_name)?;
                smtp::send(&self.config, &message, &subject, &text, &html).await
            }
        }
    }
}
