use std::path::PathBuf;

use adaptation_ledger::analysis::{self, DEFAULT_MIN_BOOK_COUNT, DEFAULT_MIN_MOVIE_COUNT};
use adaptation_ledger::catalog::{FailureLedger, PendingResolver, RecordStore, TitleRegistry};
use adaptation_ledger::config::{self, Config};
use adaptation_ledger::credentials::{self, OMDB_API_KEY_ENV};
use adaptation_ledger::db_manager::DbManager;
use adaptation_ledger::reconciliation::ReconciliationOrchestrator;
use adaptation_ledger::sources::{GoogleBooksSource, OmdbSource, TitleDiscoverySource, TitleListFile};
use clap::{Parser, Subcommand};
use log::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "adaptation-ledger",
    version,
    about = "Builds a dataset of books and their film adaptations"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register candidate titles from a newline-delimited list
    Discover {
        /// Overrides `discovery.title_list_path`
        path: Option<PathBuf>,
    },
    /// Enrich pending candidates, committing at most `max_new` new pairs
    Run {
        #[arg(long)]
        max_new: Option<usize>,
    },
    /// Print registry, record and failure counts
    Status,
    /// Compare book and film ratings over the stored pairs
    Stats {
        #[arg(long, default_value_t = DEFAULT_MIN_BOOK_COUNT)]
        min_book_count: u32,
        #[arg(long, default_value_t = DEFAULT_MIN_MOVIE_COUNT)]
        min_movie_count: u32,
    },
    /// Store the OMDb API key in the system keyring
    SetOmdbKey { api_key: String },
}

fn open_database(config: &Config) -> Result<DbManager, Box<dyn std::error::Error>> {
    let path = config
        .storage
        .resolved_database_path()
        .ok_or("could not determine a data directory; set storage.database_path")?;
    Ok(DbManager::open(&path)?)
}

fn discover(config: &Config, path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = path
        .or_else(|| {
            let configured = config.discovery.title_list_path.trim();
            (!configured.is_empty()).then(|| PathBuf::from(configured))
        })
        .ok_or("no title list given; pass a path or set discovery.title_list_path")?;
    let titles = TitleListFile::new(path).discover()?;
    let db = open_database(config)?;
    let summary = TitleRegistry::new(&db).register_all(&titles)?;
    if summary.skipped_empty > 0 {
        warn!("Skipped {} lines that normalized to nothing", summary.skipped_empty);
    }
    println!(
        "seen={} inserted={} skipped_empty={}",
        summary.seen, summary.inserted, summary.skipped_empty
    );
    Ok(())
}

fn run(config: &Config, max_new: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = credentials::resolve_omdb_api_key(
        &config.movies.api_key,
        std::env::var(OMDB_API_KEY_ENV).ok(),
        credentials::get_omdb_api_key,
    )?
    .ok_or("no OMDb API key; set movies.api_key, OMDB_API_KEY, or run set-omdb-key")?;

    let book_source = GoogleBooksSource::new(&config.books);
    let movie_source = OmdbSource::new(&config.movies, api_key);
    let orchestrator = ReconciliationOrchestrator::new(&book_source, &movie_source);

    let db = open_database(config)?;
    let summary = orchestrator.run_batch(&db, max_new.unwrap_or(config.batch.max_new))?;
    println!("{summary}");
    Ok(())
}

fn status(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    println!(
        "titles={} pairs={} failed={} pending={}",
        TitleRegistry::new(&db).len()?,
        RecordStore::new(&db).pair_count()?,
        FailureLedger::new(&db).count()?,
        PendingResolver::new(&db).pending_count()?
    );
    Ok(())
}

fn stats(
    config: &Config,
    min_book_count: u32,
    min_movie_count: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    let pairs = RecordStore::new(&db).complete_pairs()?;
    let filtered = analysis::filter_by_counts(&pairs, min_book_count, min_movie_count);
    info!(
        "Comparing {} of {} stored pairs (min_book_count={} min_movie_count={})",
        filtered.len(),
        pairs.len(),
        min_book_count,
        min_movie_count
    );

    let counts = analysis::preference_counts(&filtered);
    println!(
        "books_better={} movies_better={} ties={} total={}",
        counts.books_better, counts.movies_better, counts.ties, counts.total
    );
    if let Some(shares) = counts.shares() {
        println!(
            "books_better={:.1}% movies_better={:.1}% ties={:.1}%",
            shares.books_better * 100.0,
            shares.movies_better * 100.0,
            shares.ties * 100.0
        );
    }

    let (book_ratings, movie_ratings) = analysis::rating_points(&filtered);
    match analysis::pearson(&book_ratings, &movie_ratings) {
        Some(correlation) => println!(
            "pearson_r={:.3} p_value={:.4} n={}",
            correlation.r, correlation.p_value, correlation.points
        ),
        None => println!("pearson_r=n/a (need at least 3 varied points)"),
    }
    if let Some(fit) = analysis::linear_regression(&book_ratings, &movie_ratings) {
        println!(
            "regression slope={:.3} intercept={:.3} stderr={:.3} p_value={:.4}",
            fit.slope, fit.intercept, fit.stderr, fit.p_value
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    let config_path = cli
        .config
        .or_else(config::default_config_path)
        .ok_or("could not determine a config directory; pass --config")?;
    let config = config::load_or_create(&config_path)?;

    match cli.command {
        Command::Discover { path } => discover(&config, path),
        Command::Run { max_new } => run(&config, max_new),
        Command::Status => status(&config),
        Command::Stats {
            min_book_count,
            min_movie_count,
        } => stats(&config, min_book_count, min_movie_count),
        Command::SetOmdbKey { api_key } => {
            credentials::set_omdb_api_key(api_key.trim())?;
            println!("OMDb API key stored in the system keyring");
            Ok(())
        }
    }
}
