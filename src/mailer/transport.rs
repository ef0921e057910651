// src/mailer/transport.rs

use crate::mailer::Email;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Could not build message: {0}")]
    Build(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Unknown email server for {0}, please provide --smtpserver")]
    UnknownServer(String),
    #[error("Invalid SMTP server '{0}', expected host:port")]
    InvalidServer(String),
}

/// An open connection to a mail service.
///
/// The session is released when dropped, whether or not delivery succeeded.
pub trait MailSession {
    fn deliver(&mut self, email: &Email) -> Result<(), MailerError>;
}

/// A way of sending mail: checked once at startup, then opened per cycle.
pub trait MailTransport {
    /// Confirms the server and credentials are usable.
    fn verify(&self) -> Result<(), MailerError>;

    fn open_session(&self) -> Result<Box<dyn MailSession + '_>, MailerError>;

    /// Opens a session, sends every email in order and closes the session.
    ///
    /// Returns one result per email so callers can act on partial success.
    fn send_all(&self, emails: &[Email]) -> Result<Vec<Result<(), MailerError>>, MailerError> {
        let mut session = self.open_session()?;
        let total = emails.len();

        Ok(emails
            .iter()
            .enumerate()
            .map(|(i, email)| {
                tracing::info!("Sending email {} of {}", i + 1, total);
                let result = session.deliver(email);
                match &result {
                    Ok(()) => tracing::debug!("Sent this message:\n{}", email.render()),
                    Err(e) => tracing::warn!("Email {} of {} failed: {e}", i + 1, total),
                }
                result
            })
            .collect())
    }
}
