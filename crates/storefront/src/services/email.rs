//! Outgoing mail.
//!
//! Uses SMTP via lettre for delivery with Askama templates for the bodies.
//! Services depend on the [`Mailer`] trait so tests can record messages
//! instead of sending them.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use playtech_core::Email;

use crate::config::EmailConfig;

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    name: &'a str,
    link: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    name: &'a str,
    link: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: Email,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl OutgoingEmail {
    /// Render the password reset message carrying `link`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Template`] if a template fails to render.
    pub fn password_reset(to: &Email, name: &str, link: &str) -> Result<Self, MailError> {
        Ok(Self {
            to: to.clone(),
            subject: "Reset Password link (PlayTechInsider)".to_string(),
            text_body: PasswordResetEmailText { name, link }.render()?,
            html_body: PasswordResetEmailHtml { name, link }.render()?,
        })
    }
}

/// Delivers rendered mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message.
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP delivery through a STARTTLS relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .as_str()
                .parse()
                .map_err(|_| MailError::InvalidAddress(email.to.to_string()))?)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body),
                    ),
            )?;

        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Keeps every message instead of sending it.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingMailer {
    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: std::sync::Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::InvalidAddress(email.to.to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(email);
        Ok(())
    }
}
