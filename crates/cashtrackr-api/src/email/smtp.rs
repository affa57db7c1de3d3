// SMTP delivery through lettre's async tokio transport

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use super::templates::{confirmation_email, password_reset_email, RenderedEmail};
use super::{EmailRecipient, Mailer};
use crate::config::{EmailConfig, SmtpConfig};

/// How the connection to the relay is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmtpSecurity {
    /// Port 25, no TLS
    Plain,
    /// Port 465, TLS from the first byte
    ImplicitTls,
    /// Any other port upgrades with STARTTLS
    StartTls,
}

impl SmtpSecurity {
    fn for_port(port: u16) -> Self {
        match port {
            25 => Self::Plain,
            465 => Self::ImplicitTls,
            _ => Self::StartTls,
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    frontend_url: String,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, email: &EmailConfig) -> Result<Self> {
        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());

        let builder = match SmtpSecurity::for_port(smtp.port) {
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            }
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                .with_context(|| format!("Invalid SMTP relay {}", smtp.host))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .with_context(|| format!("Invalid SMTP relay {}", smtp.host))?
            }
        };

        let transport = builder
            .port(smtp.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self {
            transport,
            from: email.from.clone(),
            frontend_url: email.frontend_url.clone(),
        })
    }

    async fn deliver(&self, to: &str, rendered: RenderedEmail) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse::<Mailbox>().context("Invalid from address")?)
            .to(to.parse::<Mailbox>().context("Invalid recipient address")?)
            .subject(rendered.subject)
            .header(ContentType::TEXT_HTML)
            .body(rendered.html)
            .context("Failed to build email")?;

        let response = self
            .transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        tracing::info!(to = %to, code = %response.code(), "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation_email(&self, recipient: &EmailRecipient) -> Result<()> {
        let rendered = confirmation_email(recipient, &self.frontend_url);
        self.deliver(&recipient.email, rendered).await
    }

    async fn send_password_reset_token(&self, recipient: &EmailRecipient) -> Result<()> {
        let rendered = password_reset_email(recipient, &self.frontend_url);
        self.deliver(&recipient.email, rendered).await
    }
}
