//! Outgoing email over SMTP via `lettre`.
//!
//! When `SMTP_HOST` is unset the service runs in console mode: messages are
//! written to the log and reported as undelivered, so callers that depend on
//! delivery (temporary passwords) fall back to returning the secret to the
//! admin instead.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use util::config::AppConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    /// Console mode; nothing was sent.
    #[error("SMTP is not configured")]
    NotConfigured,
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    frontend_url: String,
}

impl EmailService {
    /// Builds the SMTP transport from configuration, or a console-mode
    /// service when no host is configured.
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        let from = format!("{} <{}>", cfg.email_from_name, cfg.email_from);
        let frontend_url = cfg.frontend_url.clone();

        if cfg.smtp_host.is_empty() {
            tracing::info!("SMTP_HOST not set; emails will be logged only");
            return Self::console(from, frontend_url);
        }

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host) {
            Ok(builder) => {
                let mut builder = builder.port(cfg.smtp_port);
                if !cfg.smtp_username.is_empty() {
                    builder = builder.credentials(Credentials::new(
                        cfg.smtp_username.clone(),
                        cfg.smtp_password.clone(),
                    ));
                }
                Some(builder.build())
            }
            Err(err) => {
                tracing::warn!(host = %cfg.smtp_host, error = %err, "invalid SMTP relay; falling back to console");
                None
            }
        };

        Self {
            transport,
            from,
            frontend_url,
        }
    }

    /// Log-only service.
    pub fn console(from: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            transport: None,
            from: from.into(),
            frontend_url: frontend_url.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        text: String,
        html: String,
    ) -> Result<(), EmailError> {
        let Some(transport) = &self.transport else {
            tracing::info!(to, subject, body = %text, "email (console mode)");
            return Err(EmailError::NotConfigured);
        };

        let from: Mailbox = self.from.parse()?;
        let to_box: Mailbox = to.parse()?;
        let message = Message::builder()
            .from(from)
            .to(to_box)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))?;

        transport.send(message).await?;
        tracing::info!(to, subject, "email sent");
        Ok(())
    }

    /// Welcome mail carrying a freshly generated password.
    pub async fn send_account_created(
        &self,
        to: &str,
        name: &str,
        temporary_password: &str,
    ) -> Result<(), EmailError> {
        let login = format!("{}/login", self.frontend_url);
        let text = format!(
            "Hello {name},\n\n\
             An IT Help Desk account has been created for you.\n\n\
             Email: {to}\n\
             Temporary password: {temporary_password}\n\n\
             Sign in at {login} and change your password from your profile.\n"
        );
        let html = format!(
            r#"<p>Hello {name},</p>
<p>An IT Help Desk account has been created for you.</p>
<p>Email: <strong>{to}</strong><br>Temporary password: <code>{temporary_password}</code></p>
<p><a href="{login}">Sign in</a> and change your password from your profile.</p>"#
        );
        self.send(to, "Your IT Help Desk account", text, html).await
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        temporary_password: &str,
    ) -> Result<(), EmailError> {
        let login = format!("{}/login", self.frontend_url);
        let text = format!(
            "Hello {name},\n\n\
             Your IT Help Desk password was reset by an administrator.\n\n\
             Temporary password: {temporary_password}\n\n\
             Sign in at {login} and choose a new password.\n"
        );
        let html = format!(
            r#"<p>Hello {name},</p>
<p>Your IT Help Desk password was reset by an administrator.</p>
<p>Temporary password: <code>{temporary_password}</code></p>
<p><a href="{login}">Sign in</a> and choose a new password.</p>"#
        );
        self.send(to, "Your IT Help Desk password was reset", text, html)
            .await
    }

    /// Short notice about ticket activity with a link back to the ticket.
    pub async fn send_ticket_notice(
        &self,
        to: &str,
        ticket_id: i64,
        subject: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let link = format!("{}/tickets/{ticket_id}", self.frontend_url);
        let text = format!("{message}\n\nView the ticket: {link}\n");
        let html = format!(r#"<p>{message}</p><p><a href="{link}">View the ticket</a></p>"#);
        self.send(to, subject, text, html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_mode_reports_undelivered() {
        let email = EmailService::console("Help Desk <helpdesk@localhost>", "http://localhost");
        assert!(!email.is_configured());
        let res = email
            .send_account_created("new@example.com", "New User", "Secret123")
            .await;
        assert!(matches!(res, Err(EmailError::NotConfigured)));
    }
}
