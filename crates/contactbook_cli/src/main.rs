//! Command-line driver for the contact store.
//!
//! # Responsibility
//! - Open a store file and run one contact operation against it.
//! - Import from a JSON directory export in place of a device directory.
//! - Print results as JSON so runs are easy to diff.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use contactbook_core::{
    core_version, dial_uri, init_logging, message_uri, ContactDraft, ContactId, ContactService,
    DirectoryRecord, ExternalId, ImportReconciler, InMemoryDirectory, LoggingConfig, StoreCell,
    StoreConfig,
};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "contactbook", version, about = "Manage a curated contact list")]
struct Cli {
    /// Path of the contact database file.
    #[arg(long, default_value = "contactbook.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every stored contact, sorted by name.
    List,
    /// Add one contact.
    Add(ContactFields),
    /// Replace name, number and image of a stored contact.
    Edit {
        #[arg(long)]
        id: ContactId,
        #[command(flatten)]
        fields: ContactFields,
    },
    /// Delete a stored contact.
    Delete {
        #[arg(long)]
        id: ContactId,
    },
    /// List import candidates from a JSON directory export.
    Candidates {
        #[arg(long)]
        directory: PathBuf,
    },
    /// Import candidates from a JSON directory export.
    Import {
        #[arg(long)]
        directory: PathBuf,
        /// Import every candidate.
        #[arg(long, conflicts_with = "external_id")]
        all: bool,
        /// Import the candidate with this external id (repeatable).
        #[arg(long)]
        external_id: Vec<ExternalId>,
    },
    /// Print the tel: URI for a stored contact.
    Dial {
        #[arg(long)]
        id: ContactId,
    },
    /// Print the sms: URI for a stored contact.
    Message {
        #[arg(long)]
        id: ContactId,
    },
}

#[derive(Debug, Args)]
struct ContactFields {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    image_uri: Option<String>,
}

static STORE: StoreCell = StoreCell::new();

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let config = match &cli.log_level {
            Some(level) => LoggingConfig::new(level.as_str(), log_dir.as_path()),
            None => LoggingConfig::with_default_level(log_dir.as_path()),
        };
        init_logging(&config)?;
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let store = STORE
        .get_or_open(&StoreConfig::file(&cli.db))
        .with_context(|| format!("cannot open `{}`", cli.db.display()))?;
    let contacts = ContactService::new(store.clone());

    let outcome = run(cli.command, &contacts).await;
    store.close().await?;
    outcome
}

async fn run(command: Command, contacts: &ContactService) -> Result<()> {
    match command {
        Command::List => print_json(&contacts.list_all().await?),
        Command::Add(fields) => {
            let mut draft = ContactDraft::new(fields.name, fields.phone);
            draft.image_uri = fields.image_uri;
            let id = contacts.insert(draft).await?;
            print_json(&contacts.get(id).await?)
        }
        Command::Edit { id, fields } => {
            let Some(mut record) = contacts.get(id).await? else {
                bail!("contact {id} not found");
            };
            record.name = fields.name;
            record.phone_number = fields.phone;
            record.image_uri = fields.image_uri;
            contacts.update(record.clone()).await?;
            print_json(&record)
        }
        Command::Delete { id } => {
            contacts.delete(id).await?;
            println!("deleted {id}");
            Ok(())
        }
        Command::Candidates { directory } => {
            let reconciler = ImportReconciler::new(load_directory(&directory)?, contacts.clone());
            let listing = reconciler.list_candidates();
            if let Some(err) = listing.source_error {
                bail!(err);
            }
            for candidate in &listing.candidates {
                println!(
                    "{}\t{}\t{}\t{}",
                    candidate.external_id,
                    if candidate.already_imported { "imported" } else { "new" },
                    candidate.name,
                    candidate.phone_number
                );
            }
            Ok(())
        }
        Command::Import {
            directory,
            all,
            external_id,
        } => {
            let reconciler = ImportReconciler::new(load_directory(&directory)?, contacts.clone());
            let listing = reconciler.list_candidates();
            if let Some(err) = listing.source_error {
                bail!(err);
            }

            let mut selection = listing.into_selection();
            if all {
                selection.set_all(true);
            }
            for id in external_id {
                if !selection.toggle(id, true) {
                    bail!("external id {id} is not in the directory");
                }
            }

            let report = reconciler
                .import_selected(selection.selected_candidates())
                .await?;
            println!(
                "inserted={} skipped={} failed={}",
                report.inserted.len(),
                report.skipped.len(),
                report.failed.len()
            );
            for failure in &report.failed {
                eprintln!("failed external_id={} reason={}", failure.external_id, failure.reason);
            }
            Ok(())
        }
        Command::Dial { id } => print_uri(contacts, id, dial_uri).await,
        Command::Message { id } => print_uri(contacts, id, message_uri).await,
    }
}

async fn print_uri(
    contacts: &ContactService,
    id: ContactId,
    format: fn(&contactbook_core::ContactRecord) -> Option<String>,
) -> Result<()> {
    let Some(record) = contacts.get(id).await? else {
        bail!("contact {id} not found");
    };
    match format(&record) {
        Some(uri) => println!("{uri}"),
        None => bail!("contact {id} has no phone number"),
    }
    Ok(())
}

fn load_directory(path: &Path) -> Result<InMemoryDirectory> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read `{}`", path.display()))?;
    let records: Vec<DirectoryRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("`{}` is not a directory export", path.display()))?;
    Ok(InMemoryDirectory::new(records))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
