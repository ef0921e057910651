mod brevo;
mod email;
mod smtp;
mod transport;

pub use brevo::BrevoMailer;
pub use email::{failure_body, match_header, match_subject, Email, FAILURE_SUBJECT, SENDER_NAME};
pub use smtp::{parse_server, smtp_server_for, SmtpMailer, DEFAULT_SMTP_TIMEOUT};
pub use transport::{MailSession, MailTransport, MailerError};
