// src/mailer/brevo.rs

use crate::mailer::{Email, MailSession, MailTransport, MailerError, SENDER_NAME};
use reqwest::blocking::Client;
use serde::Serialize;

const SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";
const ACCOUNT_URL: &str = "https://api.brevo.com/v3/account";

/// Sends through Brevo's transactional email API instead of SMTP.
pub struct BrevoMailer {
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

impl<'a> BrevoPayload<'a> {
    fn from_email(email: &'a Email) -> Self {
        Self {
            sender: BrevoSender {
                name: SENDER_NAME,
                email: &email.sender,
            },
            to: vec![BrevoRecipient {
                email: &email.recipient,
            }],
            subject: &email.subject,
            text_content: &email.body,
        }
    }
}

impl BrevoMailer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }

    fn send(&self, email: &Email) -> Result<(), MailerError> {
        let resp = self
            .client
            .post(SEND_URL)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&BrevoPayload::from_email(email))
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(MailerError::ApiError(format!(
                "Brevo API error: {status} - {error_body}"
            )));
        }

        Ok(())
    }
}

impl MailTransport for BrevoMailer {
    fn verify(&self) -> Result<(), MailerError> {
        let resp = self
            .client
            .get(ACCOUNT_URL)
            .header("api-key", &self.api_key)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(MailerError::ApiError(format!(
                "Brevo rejected API key: {}",
                resp.status()
            )))
        }
    }

    fn open_session(&self) -> Result<Box<dyn MailSession + '_>, MailerError> {
        Ok(Box::new(BrevoSession { mailer: self }))
    }
}

struct BrevoSession<'a> {
    mailer: &'a BrevoMailer,
}

impl MailSession for BrevoSession<'_> {
    fn deliver(&mut self, email: &Email) -> Result<(), MailerError> {
        self.mailer.send(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_brevo_field_names() {
        let email = Email {
            sender: "me@example.com".into(),
            recipient: "you@example.com".into(),
            subject: "Subject".into(),
            body: "Body".into(),
        };

        let json = serde_json::to_value(BrevoPayload::from_email(&email)).unwrap();

        assert_eq!(json["sender"]["name"], "KSL Notify");
        assert_eq!(json["sender"]["email"], "me@example.com");
        assert_eq!(json["to"][0]["email"], "you@example.com");
        assert_eq!(json["textContent"], "Body");
    }
}
