/// Delivery through a transactional email HTTP API
use super::{ContactMessage, EmailError, EmailResult};
use crate::app_config::RelayConfig;
use serde::Serialize;

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

/// POST one message to the configured API endpoint.
pub async fn send(
    client: &reqwest::Client,
    config: &RelayConfig,
    message: &ContactMessage,
    subject: &str,
    html: &str,
) -> EmailResult<()> {
    if config.api_key.trim().is_empty() {
        log::error!("Contact relay has no API key configured");
        return Err(EmailError::NotConfigured("api key"));
    }

    let payload = OutgoingEmail {
        from: &config.from,
        to: [&config.to],
        subject,
        html,
        reply_to: &message.email,
    };

    let response = client
        .post(&config.api_url)
        .bearer_auth(&config.api_key)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!("Email API rejected contact message: {} {}", status, body);
        return Err(EmailError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    log::info!("Contact message from {} relayed to {}", message.email, config.to);
    Ok(())
}
