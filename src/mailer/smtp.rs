// src/mailer/smtp.rs

use crate::mailer::{Email, MailSession, MailTransport, MailerError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Picks the SMTP submission server for well-known mail providers.
pub fn smtp_server_for(email: &str) -> Result<String, MailerError> {
    let hostname = email.rsplit('@').next().unwrap_or_default();

    let server = match hostname {
        "gmail.com" => "smtp.gmail.com:587",
        "yahoo.com" => "smtp.mail.yahoo.com:587",
        "outlook.com" | "hotmail.com" | "msn.com" => "smtp-mail.outlook.com:587",
        "comcast.net" => "smtp.comcast.net:587",
        _ => return Err(MailerError::UnknownServer(email.to_string())),
    };

    Ok(server.to_string())
}

/// Splits `host:port`.
pub fn parse_server(server: &str) -> Result<(String, u16), MailerError> {
    let (host, port) = server
        .rsplit_once(':')
        .ok_or_else(|| MailerError::InvalidServer(server.to_string()))?;

    let port = port
        .parse::<u16>()
        .map_err(|_| MailerError::InvalidServer(server.to_string()))?;

    if host.is_empty() {
        return Err(MailerError::InvalidServer(server.to_string()));
    }

    Ok((host.to_string(), port))
}

/// SMTP with STARTTLS, authenticating as the sender.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(server: &str, sender: &str, password: &str, timeout: Duration) -> Result<Self, MailerError> {
        let (host, port) = parse_server(server)?;

        Ok(Self {
            host,
            port,
            credentials: Credentials::new(sender.to_string(), password.to_string()),
            timeout,
        })
    }

    fn transport(&self) -> Result<SmtpTransport, MailerError> {
        tracing::debug!("Connecting to {}:{}", self.host, self.port);

        Ok(SmtpTransport::starttls_relay(&self.host)
            .map_err(|e| MailerError::Smtp(e.to_string()))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .timeout(Some(self.timeout))
            .build())
    }
}

impl MailTransport for SmtpMailer {
    fn verify(&self) -> Result<(), MailerError> {
        match self.transport()?.test_connection() {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailerError::Smtp(format!(
                "{}:{} did not accept the connection",
                self.host, self.port
            ))),
            Err(e) => {
                tracing::error!("SMTP server rejected email+password");
                Err(MailerError::Smtp(e.to_string()))
            }
        }
    }

    fn open_session(&self) -> Result<Box<dyn MailSession + '_>, MailerError> {
        tracing::debug!("Opening email session...");
        Ok(Box::new(SmtpSession {
            transport: self.transport()?,
        }))
    }
}

struct SmtpSession {
    transport: SmtpTransport,
}

impl MailSession for SmtpSession {
    fn deliver(&mut self, email: &Email) -> Result<(), MailerError> {
        let message = build_message(email)?;
        self.transport
            .send(&message)
            .map_err(|e| MailerError::Smtp(e.to_string()))?;
        Ok(())
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        tracing::debug!("Email session closed.");
    }
}

fn build_message(email: &Email) -> Result<Message, MailerError> {
    let from: Mailbox = email
        .from_header()
        .parse()
        .map_err(|e| MailerError::Address(format!("{}: {e}", email.sender)))?;
    let to: Mailbox = email
        .recipient
        .parse()
        .map_err(|e| MailerError::Address(format!("{}: {e}", email.recipient)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| MailerError::Build(e.to_string()))
}
