// src/mailer/email.rs

pub const SENDER_NAME: &str = "KSL Notify";
pub const FAILURE_SUBJECT: &str = "KSL Notifier Failure";

/// A plain-text message ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// `KSL Notify <sender@example.com>`
    pub fn from_header(&self) -> String {
        format!("{SENDER_NAME} <{}>", self.sender)
    }

    /// Header block plus body, the way it appears on the wire.
    pub fn render(&self) -> String {
        format!(
            "Subject: {}\r\nTo: {}\r\nFrom: {}\r\n\r\n{}",
            self.subject,
            self.recipient,
            self.from_header(),
            self.body
        )
    }
}

pub fn match_subject(query: &str, time: &str, n: usize, total: usize) -> String {
    format!("{query} search match on KSL Classifieds at {time} ({n} of {total})")
}

/// Plural wording follows the total number of new listings for the query.
pub fn match_header(query: &str, total_new: usize) -> String {
    let plural = if total_new > 1 { "es" } else { "" };
    format!("New match{plural} found for query {query}")
}

pub fn failure_body(failure_count: u32, abort_count: u32, error: &str) -> String {
    format!(
        "Exception in script detected.\n\
         Exception count {failure_count}\n\
         The script will die after the count reaches {abort_count}\n\
         {error}"
    )
}
