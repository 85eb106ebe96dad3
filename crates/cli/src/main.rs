//! SprintDigest CLI - email each assignee a digest of the current iteration.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sprintdigest_notify::{AddressBook, ConsoleTransport, MailTransport, Notifier, SesTransport};
use sprintdigest_progress::render_summary;
use sprintdigest_tracker::GithubProjectClient;
use sprintdigest_work::{DigestRun, RunOutcome};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, MailConfig};

/// Exit status when no iteration is active: nothing to do.
const EXIT_NO_ACTIVE_ITERATION: u8 = 2;

#[derive(Parser)]
#[command(name = "sprintdigest")]
#[command(about = "Email each assignee a digest of the current iteration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, classify and email the digests
    Send {
        /// Print emails instead of sending them
        #[arg(long)]
        dry_run: bool,
        /// Address book YAML (overrides DIGEST_ADDRESS_BOOK)
        #[arg(long)]
        address_book: Option<PathBuf>,
        /// Maximum sends in flight (overrides DIGEST_SEND_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Print the digest document as JSON
    Digest {
        /// Print a readable per-assignee summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// List iterations and their windows
    Iterations,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::from_env().context("invalid configuration")?;
    let source = GithubProjectClient::new(config.github.clone())
        .context("failed to build GraphQL client")?;
    let run = DigestRun::with_config(source, config.run.clone());
    let now = Utc::now();

    match cli.command {
        Commands::Iterations => {
            let listing = run.list_iterations(now).await?;

            println!("Iterations ({})", listing.len());
            for entry in listing {
                println!(
                    "{} {} | {} .. {} | {}",
                    if entry.current { "*" } else { " " },
                    entry.iteration.id,
                    entry.window.start.date(),
                    entry.window.end.date(),
                    entry.iteration.title.as_deref().unwrap_or("-"),
                );
            }
        }
        Commands::Digest { summary } => {
            let Some(prepared) = run.prepare(now).await? else {
                println!("No active iteration found.");
                return Ok(ExitCode::from(EXIT_NO_ACTIVE_ITERATION));
            };

            if summary {
                print!("{}", render_summary(&prepared.classification.digests));
            } else {
                println!("{}", prepared.document.to_json()?);
            }
        }
        Commands::Send {
            dry_run,
            address_book,
            concurrency,
        } => {
            let book_path = address_book.unwrap_or_else(|| config.address_book.clone());
            let book = AddressBook::load(&book_path)?;

            let transport: Arc<dyn MailTransport> = if dry_run {
                Arc::new(ConsoleTransport::new())
            } else {
                let mail = MailConfig::from_env().context("invalid mail configuration")?;
                Arc::new(SesTransport::new(mail.ses_config(config.http_timeout))?)
            };

            let notifier = Notifier::new(transport, book)
                .with_subject(config.subject.clone())
                .with_concurrency(concurrency.unwrap_or(config.send_concurrency));

            match run.run(&notifier, now).await? {
                RunOutcome::NoActiveIteration => {
                    println!("No active iteration found.");
                    return Ok(ExitCode::from(EXIT_NO_ACTIVE_ITERATION));
                }
                RunOutcome::Completed(summary) => {
                    let sent = summary.delivery.sent.len();
                    let failed = summary.delivery.failed.len();

                    if dry_run {
                        println!("{}", summary.document.to_json()?);
                    }

                    for (assignee, err) in &summary.delivery.failed {
                        error!("Digest for {} was not delivered: {}", assignee, err);
                    }
                    info!(
                        "Iteration {}: {} digests sent, {} failed",
                        summary.iteration.id, sent, failed
                    );
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
