//! The digest run - one pass of the pipeline.

use sprintdigest_core::{IterationDef, Time};
use sprintdigest_notify::{DeliveryReport, Notifier};
use sprintdigest_progress::{
    format_document, render_summary, Classification, ClassificationStats, ClassifierConfig,
    DigestDocument, IterationResolver, IterationWindow, TaskClassifier, DEFAULT_ITERATION_DAYS,
};
use sprintdigest_tracker::{FetchError, ProjectSource};
use tracing::{debug, info, warn};

/// Configuration for a digest run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Iteration length in days
    pub iteration_days: u32,

    /// Field names read from work items
    pub classifier: ClassifierConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iteration_days: DEFAULT_ITERATION_DAYS,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Upstream project data could not be fetched
    #[error("error fetching project data: {0}")]
    Fetch(#[from] FetchError),
}

/// Classified data of a run, ready to be printed or sent.
#[derive(Debug, Clone)]
pub struct PreparedDigest {
    /// The current iteration
    pub iteration: IterationDef,

    /// Per-assignee digests and counters
    pub classification: Classification,

    /// The transport-ready document
    pub document: DigestDocument,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// The current iteration
    pub iteration: IterationDef,

    /// The document that was sent
    pub document: DigestDocument,

    /// Classification counters
    pub stats: ClassificationStats,

    /// Per-assignee send outcomes
    pub delivery: DeliveryReport,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// No iteration window contains the run time; nobody was emailed
    NoActiveIteration,

    /// Digests were sent, possibly with per-assignee failures
    Completed(RunSummary),
}

/// An iteration with its window, for listings.
#[derive(Debug, Clone)]
pub struct IterationListing {
    /// Iteration definition
    pub iteration: IterationDef,

    /// Computed window
    pub window: IterationWindow,

    /// Whether this is the resolved current iteration
    pub current: bool,
}

/// Runs the digest pipeline against a project source.
pub struct DigestRun<S: ProjectSource> {
    source: S,
    resolver: IterationResolver,
    classifier: TaskClassifier,
}

impl<S: ProjectSource> DigestRun<S> {
    /// Create a run with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, RunConfig::default())
    }

    /// Create a run with explicit configuration.
    pub fn with_config(source: S, config: RunConfig) -> Self {
        Self {
            source,
            resolver: IterationResolver::with_length(config.iteration_days),
            classifier: TaskClassifier::new(config.classifier),
        }
    }

    /// Get a reference to the project source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// List every iteration with its window, marking the current one.
    pub async fn list_iterations(&self, now: Time) -> Result<Vec<IterationListing>, RunError> {
        let iterations = self.source.fetch_iterations().await?;
        let current = self.resolver.resolve(&iterations, now).map(|it| it.id.clone());

        Ok(iterations
            .iter()
            .map(|iteration| IterationListing {
                window: self.resolver.window(iteration),
                current: current.as_ref() == Some(&iteration.id),
                iteration: iteration.clone(),
            })
            .collect())
    }

    /// Fetch, resolve and classify. `None` means there is no active
    /// iteration at `now`.
    pub async fn prepare(&self, now: Time) -> Result<Option<PreparedDigest>, RunError> {
        let iterations = self.source.fetch_iterations().await?;
        let Some(iteration) = self.resolver.resolve(&iterations, now).cloned() else {
            warn!("No active iteration found at {}", now);
            return Ok(None);
        };
        info!("Current iteration: {}", iteration.id);

        let items = self.source.fetch_items().await?;
        let classification = self.classifier.classify(&items, &iteration.id);
        let stats = classification.stats;
        info!(
            "Classified {} of {} items for {} assignees \
             ({} unassigned, {} other iteration, {} untracked status)",
            stats.classified,
            stats.considered,
            classification.digests.len(),
            stats.unassigned,
            stats.other_iteration,
            stats.unmapped_status,
        );
        debug!("Iteration data:\n{}", render_summary(&classification.digests));

        let document = format_document(&classification.digests, now.date_naive());

        Ok(Some(PreparedDigest {
            iteration,
            classification,
            document,
        }))
    }

    /// Run the full pipeline and email every assignee.
    pub async fn run(&self, notifier: &Notifier, now: Time) -> Result<RunOutcome, RunError> {
        let Some(prepared) = self.prepare(now).await? else {
            return Ok(RunOutcome::NoActiveIteration);
        };

        let delivery = notifier.notify_all(&prepared.document).await;
        info!(
            "Sent {} of {} digests ({} failed)",
            delivery.sent.len(),
            delivery.attempted(),
            delivery.failed.len()
        );

        Ok(RunOutcome::Completed(RunSummary {
            iteration: prepared.iteration,
            document: prepared.document,
            stats: prepared.classification.stats,
            delivery,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sprintdigest_core::{FieldValue, MessageId, WorkItem};
    use sprintdigest_notify::{AddressBook, MailTransport, OutgoingEmail, SendError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeSource {
        iterations: Vec<IterationDef>,
        items: Vec<WorkItem>,
        fail_items: bool,
        item_fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(iterations: Vec<IterationDef>, items: Vec<WorkItem>) -> Self {
            Self {
                iterations,
                items,
                fail_items: false,
                item_fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProjectSource for FakeSource {
        async fn fetch_iterations(&self) -> sprintdigest_tracker::Result<Vec<IterationDef>> {
            Ok(self.iterations.clone())
        }

        async fn fetch_items(&self) -> sprintdigest_tracker::Result<Vec<WorkItem>> {
            self.item_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_items {
                return Err(FetchError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(self.items.clone())
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, SendError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail_for.as_deref() == email.to.first().map(String::as_str) {
                return Err(SendError::Rejected {
                    status: 400,
                    body: "rejected".to_string(),
                });
            }
            Ok(MessageId::new("ok"))
        }
    }

    fn item(title: &str, assignee: &str, status: &str, iteration: &str) -> WorkItem {
        WorkItem::new(format!("PVTI_{}", title), title)
            .with_assignee(assignee)
            .with_field(FieldValue::single_select("Status", status))
            .with_field(FieldValue::iteration("DT24-", iteration))
    }

    fn iterations() -> Vec<IterationDef> {
        vec![
            IterationDef::new("OLD", NaiveDate::from_ymd_opt(2023, 12, 11).unwrap()),
            IterationDef::new("CUR", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        ]
    }

    fn now() -> Time {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    fn book() -> AddressBook {
        AddressBook::from_entries([
            ("SENDER_MAIL", "digest@example.com"),
            ("alice", "alice@example.com"),
            ("bob", "bob@example.com"),
        ])
    }

    #[tokio::test]
    async fn test_end_to_end_only_current_iteration_is_emailed() {
        let source = FakeSource::new(
            iterations(),
            vec![
                item("A", "alice", "In Progress", "CUR"),
                item("B", "bob", "Spring Todo", "OLD"),
            ],
        );
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(transport.clone(), book());

        let outcome = DigestRun::new(source).run(&notifier, now()).await.unwrap();

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(summary.iteration.id.as_str(), "CUR");
        assert_eq!(summary.document.assignees_task_progress.len(), 1);
        let alice = &summary.document.assignees_task_progress[0];
        assert_eq!(alice.assignee, "alice");
        assert_eq!(alice.tasks.in_progress.len(), 1);
        assert_eq!(alice.tasks.in_progress[0].title, "A");

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
        assert!(sent[0].body.contains("update for 2024-01-10"));
    }

    #[tokio::test]
    async fn test_no_active_iteration_sends_nothing() {
        let source = FakeSource::new(iterations(), vec![item("A", "alice", "In Progress", "CUR")]);
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(transport.clone(), book());
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let run = DigestRun::new(source);
        let outcome = run.run(&notifier, later).await.unwrap();

        assert!(matches!(outcome, RunOutcome::NoActiveIteration));
        assert!(transport.sent.lock().unwrap().is_empty());
        assert_eq!(run.source().item_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_before_sending() {
        let mut source = FakeSource::new(iterations(), vec![]);
        source.fail_items = true;
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(transport.clone(), book());

        let err = DigestRun::new(source).run(&notifier, now()).await.unwrap_err();

        assert!(matches!(err, RunError::Fetch(FetchError::Status { status: 500, .. })));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_does_not_block_others() {
        let source = FakeSource::new(
            iterations(),
            vec![
                item("A", "alice", "In Progress", "CUR"),
                item("B", "bob", "Under Review", "CUR"),
            ],
        );
        let transport = Arc::new(RecordingTransport {
            fail_for: Some("alice@example.com".to_string()),
            ..Default::default()
        });
        let notifier = Notifier::new(transport.clone(), book());

        let outcome = DigestRun::new(source).run(&notifier, now()).await.unwrap();

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(summary.delivery.failed.len(), 1);
        assert_eq!(summary.delivery.sent.len(), 1);
        assert_eq!(summary.delivery.sent[0].0, "bob");
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_iterations_marks_current() {
        let run = DigestRun::new(FakeSource::new(iterations(), vec![]));

        let listing = run.list_iterations(now()).await.unwrap();

        assert_eq!(listing.len(), 2);
        assert!(!listing[0].current);
        assert!(listing[1].current);
        assert_eq!(listing[1].window.end.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }
}
