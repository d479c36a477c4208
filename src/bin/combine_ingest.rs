use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use combine_comps::combine_dataset;
use combine_comps::config::{Config, season_range};
use combine_comps::logging;

/// Fetch draft combine batches for a season range and store them in SQLite.
#[derive(Parser, Debug)]
#[command(name = "combine_ingest")]
struct Args {
    /// SQLite path (defaults to the cache dir)
    #[arg(long)]
    db: Option<PathBuf>,

    /// First season start year, e.g. 2000 for 2000-01
    #[arg(long)]
    first: Option<i32>,

    /// Last season start year (inclusive)
    #[arg(long)]
    last: Option<i32>,

    /// Concurrent season fetches
    #[arg(long)]
    parallelism: Option<usize>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = Args::parse();
    let config = Config::from_env();
    logging::init_logging(&config.log_filter)?;

    let first = args.first.unwrap_or(config.first_season);
    let last = args.last.unwrap_or(config.last_season).max(first);
    let seasons = season_range(first, last);

    let db_path = args
        .db
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;

    let mut conn = combine_dataset::open_db(&db_path)?;
    let summary = combine_dataset::ingest_seasons(
        &mut conn,
        db_path.clone(),
        &seasons,
        args.parallelism.unwrap_or(config.fetch_parallelism),
        config.request_timeout_secs,
    )?;

    println!("Draft combine ingest complete");
    println!("DB: {}", summary.db_path.display());
    println!(
        "Seasons: {}/{}",
        summary.seasons_succeeded, summary.seasons_total
    );
    println!("Rows stored: {}", summary.rows_stored);
    if let Some(latest) = summary.latest_season {
        println!("Latest season: {latest}");
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
