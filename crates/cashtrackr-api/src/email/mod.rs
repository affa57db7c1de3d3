// Outgoing account emails
// Decision: Delivery sits behind a trait so tests can capture issued tokens
// Decision: Without SMTP settings, messages are written to the log instead

mod smtp;
mod templates;

use anyhow::Result;
use async_trait::async_trait;

pub use smtp::SmtpMailer;
pub use templates::{confirmation_email, password_reset_email, RenderedEmail};

/// Who receives an account email, and the code it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecipient {
    pub name: String,
    pub email: String,
    pub token: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_email(&self, recipient: &EmailRecipient) -> Result<()>;

    async fn send_password_reset_token(&self, recipient: &EmailRecipient) -> Result<()>;
}

/// Logs messages instead of sending them (dev mode)
pub struct LogMailer {
    frontend_url: String,
}

impl LogMailer {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation_email(&self, recipient: &EmailRecipient) -> Result<()> {
        let rendered = confirmation_email(recipient, &self.frontend_url);
        tracing::info!(
            to = %recipient.email,
            token = %recipient.token,
            subject = %rendered.subject,
            "Confirmation email (not sent, SMTP not configured)"
        );
        Ok(())
    }

    async fn send_password_reset_token(&self, recipient: &EmailRecipient) -> Result<()> {
        let rendered = password_reset_email(recipient, &self.frontend_url);
        tracing::info!(
            to = %recipient.email,
            token = %recipient.token,
            subject = %rendered.subject,
            "Password reset email (not sent, SMTP not configured)"
        );
        Ok(())
    }
}
