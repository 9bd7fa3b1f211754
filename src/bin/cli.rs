//! jotdb CLI
//!
//! Command-line interface for inspecting and mutating a jotdb file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jotdb::{Database, Document};

/// jotdb CLI
#[derive(Parser, Debug)]
#[command(name = "jotdb-cli")]
#[command(about = "CLI for the jotdb document store")]
struct Args {
    /// Path of the database file
    #[arg(short, long, default_value = "jotdb.jsonl")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a document by identifier
    Get {
        /// The identifier to look up
        id: String,
    },

    /// Store a document under an identifier
    Put {
        /// The identifier to store under
        id: String,

        /// The document, as a JSON object
        document: String,
    },

    /// Store a document under a fresh identifier and print it
    Insert {
        /// The document, as a JSON object
        document: String,
    },

    /// Print the number of stored documents
    Count,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&args.db)?;
    let mut exit_code = 0;

    match args.command {
        Commands::Get { id } => match db.get(&id) {
            Some(doc) => println!("{}", serde_json::to_string(&doc)?),
            None => {
                eprintln!("no document with id {id}");
                exit_code = 2;
            }
        },
        Commands::Put { id, document } => {
            db.put(&id, parse_document(&document)?)?;
        }
        Commands::Insert { document } => {
            let new_id = db.insert(parse_document(&document)?)?;
            println!("{new_id}");
        }
        Commands::Count => println!("{}", db.count()),
    }

    db.exit()?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn parse_document(raw: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let doc: Document = serde_json::from_str(raw)?;
    Ok(doc)
}
