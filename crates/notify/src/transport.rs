//! Mail transport abstraction.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sprintdigest_core::MessageId;
use tracing::info;

/// Errors sending a single message. They are reported per recipient and
/// never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail service refused the message
    #[error("mail service rejected the message ({status}): {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The configured endpoint is not a usable URL
    #[error("invalid mail endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request could not be signed
    #[error("request signing failed: {0}")]
    Signing(String),

    /// The mail service answered with an unexpected body
    #[error("malformed mail service response: {0}")]
    Malformed(String),
}

/// A plain-text email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Source address
    pub from: String,

    /// Destination addresses
    pub to: Vec<String>,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// Something that can deliver an email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a message and return the id the service assigned to it.
    async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, SendError>;
}

/// Prints messages instead of sending them.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    sent: AtomicUsize,
}

impl ConsoleTransport {
    /// Create a console transport.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, SendError> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Dry run: not sending email to {:?}", email.to);
        println!(
            "From: {}\nTo: {}\nSubject: {}\n\n{}",
            email.from,
            email.to.join(", "),
            email.subject,
            email.body
        );
        Ok(MessageId::new(format!("dry-run-{}", n)))
    }
}
