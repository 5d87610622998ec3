//! Command-line probe for a Bibliodex catalogue database.
//!
//! # Responsibility
//! - Verify `bibliodex_core` linkage and schema migration from a shell.
//! - Print catalogue pages as JSON for quick inspection.
//!
//! Configuration via environment:
//! - BIBLIODEX_DB: catalogue database path (in-memory when unset)
//! - BIBLIODEX_LOG_LEVEL: trace|debug|info|warn|error
//! - BIBLIODEX_LOG_DIR: absolute directory for rolling log files

use bibliodex_core::{
    catalogue_stats, AuthorListQuery, AuthorRepository, PaperListQuery, PaperRepository,
    SqliteAuthorRepository, SqlitePaperRepository, Store, StoreConfig,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Bibliodex catalogue CLI
#[derive(Parser)]
#[command(name = "bibliodex")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Catalogue database file; an empty in-memory catalogue when omitted
    #[arg(long, env = "BIBLIODEX_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level for file logging
    #[arg(long, env = "BIBLIODEX_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files; logging stays off when omitted
    #[arg(long, env = "BIBLIODEX_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print health and version information
    Ping,

    /// Print paper and author totals
    Stats,

    /// Print one page of papers as JSON
    Papers(PapersArgs),

    /// Print one page of authors as JSON
    Authors(AuthorsArgs),
}

#[derive(Args)]
struct PapersArgs {
    /// Exact publication year
    #[arg(long)]
    year: Option<i32>,

    /// Case-insensitive venue substring
    #[arg(long)]
    venue: Option<String>,

    /// Case-insensitive author name substring; repeat to require several
    #[arg(long = "author")]
    authors: Vec<String>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct AuthorsArgs {
    /// Case-insensitive name substring
    #[arg(long)]
    name: Option<String>,

    /// Case-insensitive affiliation substring
    #[arg(long)]
    affiliation: Option<String>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct PageArgs {
    /// Page size (1-100, default 10)
    #[arg(long)]
    limit: Option<u32>,

    /// Number of matches to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| bibliodex_core::default_log_level());
        bibliodex_core::init_logging(level, log_dir)?;
    }

    match cli.command {
        Commands::Ping => {
            println!("bibliodex_core ping={}", bibliodex_core::ping());
            println!("bibliodex_core version={}", bibliodex_core::core_version());
        }
        Commands::Stats => {
            let stats = catalogue_stats(&open_store(cli.db)?)?;
            info!(
                "event=cli_stats module=cli status=ok papers={} authors={}",
                stats.papers, stats.authors
            );
            println!("papers={}", stats.papers);
            println!("authors={}", stats.authors);
        }
        Commands::Papers(args) => {
            let papers = SqlitePaperRepository::new(open_store(cli.db)?);
            let page = papers.list_papers(&PaperListQuery {
                year: args.year,
                venue: args.venue,
                authors: args.authors,
                limit: args.page.limit,
                offset: args.page.offset,
            })?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Commands::Authors(args) => {
            let authors = SqliteAuthorRepository::new(open_store(cli.db)?);
            let page = authors.list_authors(&AuthorListQuery {
                name: args.name,
                affiliation: args.affiliation,
                limit: args.page.limit,
                offset: args.page.offset,
            })?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
    }

    Ok(())
}

fn open_store(db: Option<PathBuf>) -> CliResult<Store> {
    let config = match db {
        Some(path) => StoreConfig::file(path),
        None => StoreConfig::memory(),
    };
    Ok(Store::open(&config)?)
}
