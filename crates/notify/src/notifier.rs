//! Per-assignee digest notification.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use sprintdigest_core::MessageId;
use sprintdigest_progress::{format_email_body, DigestDocument, TaskTitles};
use tracing::{error, info, warn};

use crate::address_book::AddressBook;
use crate::transport::{MailTransport, OutgoingEmail, SendError};

/// Subject used when none is configured.
pub const DEFAULT_SUBJECT: &str = "Task Progress Update";

/// Outcome of sending a whole digest.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Assignees whose digest was accepted, with the message id
    pub sent: Vec<(String, MessageId)>,

    /// Assignees whose digest failed, with the error
    pub failed: Vec<(String, SendError)>,
}

impl DeliveryReport {
    /// Number of sends attempted.
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }

    /// Whether every attempted send succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Emails digests to assignees.
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    address_book: AddressBook,
    subject: String,
    concurrency: usize,
}

impl Notifier {
    /// Create a notifier that sends one message at a time.
    pub fn new(transport: Arc<dyn MailTransport>, address_book: AddressBook) -> Self {
        Self {
            transport,
            address_book,
            subject: DEFAULT_SUBJECT.to_string(),
            concurrency: 1,
        }
    }

    /// Set the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Allow up to `n` sends in flight at once.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Build the email for one assignee.
    ///
    /// Unknown sender or recipient addresses are left empty; the transport
    /// decides whether that is acceptable.
    pub fn compose(&self, assignee: &str, tasks: &TaskTitles, date: NaiveDate) -> OutgoingEmail {
        let from = self.address_book.sender();
        if from.is_empty() {
            warn!("Address book has no sender entry; sending with an empty source");
        }
        if !self.address_book.contains(assignee) {
            warn!("No address for {}; sending with an empty destination", assignee);
        }
        let to = self.address_book.lookup(assignee);

        OutgoingEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: self.subject.clone(),
            body: format_email_body(assignee, tasks, date),
        }
    }

    /// Send one assignee's digest.
    pub async fn notify(
        &self,
        assignee: &str,
        tasks: &TaskTitles,
        date: NaiveDate,
    ) -> Result<MessageId, SendError> {
        let email = self.compose(assignee, tasks, date);
        let id = self.transport.send(&email).await?;
        info!("Email sent to {} successfully. Message ID: {}", assignee, id);
        Ok(id)
    }

    /// Send every assignee's digest. A failure is logged and recorded but
    /// does not stop the remaining sends.
    pub async fn notify_all(&self, document: &DigestDocument) -> DeliveryReport {
        let outcomes: Vec<(String, Result<MessageId, SendError>)> =
            stream::iter(document.assignees_task_progress.iter())
                .map(|progress| async move {
                    let result = self
                        .notify(&progress.assignee, &progress.tasks, document.date)
                        .await;
                    (progress.assignee.clone(), result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut report = DeliveryReport::default();
        for (assignee, result) in outcomes {
            match result {
                Ok(id) => report.sent.push((assignee, id)),
                Err(e) => {
                    error!("Error sending email to {}: {}", assignee, e);
                    report.failed.push((assignee, e));
                }
            }
        }
        report
    }
}
