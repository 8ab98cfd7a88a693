/// SMTP delivery of contact messages
use super::{ContactMessage, EmailError, EmailResult};
use crate::app_config::RelayConfig;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

fn mailbox(value: &str, what: &str) -> EmailResult<Mailbox> {
    value
        .parse()
        .map_err(|e| EmailError::Address(format!("{} address {:?}: {}", what, value, e)))
}

/// Build the multipart message with the visitor as reply-to.
pub fn build_message(
    config: &RelayConfig,
    message: &ContactMessage,
    subject: &str,
    body_text: &str,
    body_html: &str,
) -> EmailResult<Message> {
    let email = Message::builder()
        .from(mailbox(&config.from, "from")?)
        .to(mailbox(&config.to, "to")?)
        .reply_to(mailbox(&message.email, "reply-to")?)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(body_text.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(body_html.to_string()),
                ),
        )?;

    Ok(email)
}

/// Send a contact message via SMTP
pub async fn send(
    config: &RelayConfig,
    message: &ContactMessage,
    subject: &str,
    body_text: &str,
    body_html: &str,
) -> EmailResult<()> {
    if config.smtp_host.trim().is_empty() {
        log::error!("Contact relay has no SMTP host configured");
        return Err(EmailError::NotConfigured("smtp host"));
    }

    let email = build_message(config, message, subject, body_text, body_html)?;

    let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
    let mailer = if config.smtp_tls {
        SmtpTransport::relay(&config.smtp_host)?
            .credentials(creds)
            .port(config.smtp_port)
            .build()
    } else {
        SmtpTransport::builder_dangerous(&config.smtp_host)
            .credentials(creds)
            .port(config.smtp_port)
            .build()
    };

    // The SMTP client blocks, keep it off the async workers
    actix_web::web::block(move || mailer.send(&email))
        .await
        .map_err(|_| EmailError::Blocking)??;

    log::info!("Contact message from {} relayed to {}", message.email, config.to);

    Ok(())
}
