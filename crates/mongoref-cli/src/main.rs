//! mongoref CLI
//!
//! Usage:
//!   mongoref ping                                   Check the server is reachable
//!   mongoref resolve -c modules --id <uuid>         Resolve a reference and print it
//!   mongoref resolve -c modules --id m1 --id-type string --strict
//!   mongoref sample                                 Run the reference walkthrough
//!   mongoref sample --memory                        Same, against an in-memory store
//!   mongoref sample --embedded                      Store the module inside the project instead
//!
//! Connection settings come from --uri/--database, MONGOREF_URI/MONGOREF_DATABASE,
//! or a TOML file given with --config.

use anyhow::{Context, Result};
use bson::{oid::ObjectId, Bson, Uuid};
use clap::{Parser, Subcommand, ValueEnum};
use mongoref_core::{
    DocumentReference, DocumentStore, MemoryStore, MissingCollectionPolicy, ReferenceResolver,
};
use mongoref_mongodb::Connection;
use std::path::PathBuf;
use tracing::info;

mod config;
mod models;
mod sample;

use config::{MongoRefConfig, Overrides, Settings};
use models::RawDocument;
use sample::SampleStore;

#[derive(Parser)]
#[command(name = "mongoref")]
#[command(about = "Resolve cross-collection document references", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a mongoref.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Default database
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping the configured server
    Ping,
    /// Resolve one reference and print the document as extended JSON
    Resolve {
        /// Collection the reference points into
        #[arg(short, long)]
        collection: String,

        /// Identifier of the referenced document
        #[arg(long)]
        id: String,

        /// How to interpret --id
        #[arg(long, value_enum, default_value_t = IdType::Uuid)]
        id_type: IdType,

        /// Database the reference points into (defaults to --database)
        #[arg(long)]
        db: Option<String>,

        /// Fail with "collection not found" instead of "not found" for missing collections
        #[arg(long)]
        strict: bool,
    },
    /// Insert a project referencing a module, then follow the reference
    Sample {
        /// Run against an in-memory store instead of MongoDB
        #[arg(long)]
        memory: bool,

        /// Embed the module in the project document instead of referencing it
        #[arg(long)]
        embedded: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IdType {
    Uuid,
    Oid,
    String,
    Int,
}

fn parse_id(raw: &str, id_type: IdType) -> Result<Bson> {
    let id = match id_type {
        IdType::Uuid => Bson::from(
            Uuid::parse_str(raw).with_context(|| format!("Invalid UUID: {}", raw))?,
        ),
        IdType::Oid => Bson::ObjectId(
            ObjectId::parse_str(raw).with_context(|| format!("Invalid ObjectId: {}", raw))?,
        ),
        IdType::String => Bson::String(raw.to_string()),
        IdType::Int => Bson::Int64(
            raw.parse()
                .with_context(|| format!("Invalid integer id: {}", raw))?,
        ),
    };
    Ok(id)
}

/// Build the reference named on the command line
fn build_reference(
    collection: &str,
    id: &str,
    id_type: IdType,
    db: Option<&str>,
) -> Result<DocumentReference<Bson>> {
    let reference = DocumentReference::new(collection, parse_id(id, id_type)?)?;
    match db {
        Some(db) => Ok(reference.in_database(db)?),
        None => Ok(reference),
    }
}

/// Resolve a reference into whatever document it points at, as relaxed extended JSON
async fn resolve_raw<S: DocumentStore>(
    store: &S,
    reference: &DocumentReference<Bson>,
    policy: MissingCollectionPolicy,
) -> Result<serde_json::Value> {
    let resolver = ReferenceResolver::new(store).with_policy(policy);
    let RawDocument(document) = resolver
        .resolve::<RawDocument>(reference)
        .await
        .with_context(|| format!("Failed to resolve {}", reference))?;
    Ok(Bson::Document(document).into_relaxed_extjson())
}

/// Initialize logging based on log level
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized
}

async fn run_sample<S: SampleStore>(store: &S, embedded: bool) -> Result<()> {
    if embedded {
        let project = sample::run_embedded(store).await?;
        let names: Vec<&str> = project.modules.iter().map(|m| m.name.as_str()).collect();
        println!(
            "Project: {} ({}), embedded modules: {}",
            project.name,
            project.id,
            names.join(", ")
        );
        return Ok(());
    }

    let outcome = sample::run(store).await?;
    println!("Module:  {} ({})", outcome.module.name, outcome.module.id);
    println!(
        "Project: {} ({}), {} module reference(s), renamed: {}",
        outcome.project.name,
        outcome.project.id,
        outcome.project.module_count(),
        outcome.renamed
    );
    Ok(())
}

async fn connect(settings: &Settings) -> Result<Connection> {
    Connection::with_database(&settings.uri, &settings.database, settings.pool.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", settings.uri))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let file = match &cli.config {
        Some(path) => MongoRefConfig::load(path)?,
        None => MongoRefConfig::default(),
    };
    let overrides = Overrides {
        uri: cli.uri.clone(),
        database: cli.database.clone(),
    };
    let settings = Settings::resolve(file, overrides, |key| std::env::var(key).ok());

    match cli.command {
        Commands::Ping => {
            let conn = connect(&settings).await?;
            conn.ping().await?;
            println!("ok: {}", conn.database_name());
        }
        Commands::Resolve {
            collection,
            id,
            id_type,
            db,
            strict,
        } => {
            let reference = build_reference(&collection, &id, id_type, db.as_deref())?;
            let policy = if strict {
                MissingCollectionPolicy::Strict
            } else {
                MissingCollectionPolicy::Empty
            };

            let conn = connect(&settings).await?;
            let json = resolve_raw(&conn, &reference, policy).await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Sample { memory, embedded } => {
            if memory {
                info!("Running sample against in-memory store");
                run_sample(&MemoryStore::new(settings.database.clone()), embedded).await?;
            } else {
                let conn = connect(&settings).await?;
                info!(database = conn.database_name(), "Running sample against MongoDB");
                run_sample(&conn, embedded).await?;
            }
        }
    }

    Ok(())
}
