use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use combine_comps::comparison::compare;
use combine_comps::config::Config;
use combine_comps::enrichment::RankingFilter;
use combine_comps::error::RankError;
use combine_comps::export;
use combine_comps::logging;
use combine_comps::pipeline;
use combine_comps::records::QueryVector;

/// Rank draft combine players by physical similarity to a query.
#[derive(Parser, Debug)]
#[command(name = "combine_rank")]
struct Args {
    /// Height without shoes (inches)
    #[arg(long)]
    height: Option<f64>,

    /// Wingspan (inches)
    #[arg(long)]
    wingspan: Option<f64>,

    /// Standing reach (inches)
    #[arg(long)]
    reach: Option<f64>,

    /// Hand length (inches)
    #[arg(long)]
    hand_length: Option<f64>,

    /// Hand width (inches)
    #[arg(long)]
    hand_width: Option<f64>,

    /// How many players to print
    #[arg(long)]
    top: Option<usize>,

    /// Only keep players drafted at or before this pick (needs enrichment)
    #[arg(long)]
    max_pick: Option<u32>,

    /// Only keep players with at least this many minutes (needs enrichment)
    #[arg(long)]
    min_minutes: Option<f64>,

    /// Write the comparison to an .xlsx workbook
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = Args::parse();
    let config = Config::from_env();
    logging::init_logging(&config.log_filter)?;

    let query = QueryVector {
        height_wo_shoes: args.height,
        wingspan: args.wingspan,
        standing_reach: args.reach,
        hand_length: args.hand_length,
        hand_width: args.hand_width,
    };
    let filter = RankingFilter {
        max_draft_pick: args.max_pick.or(config.ranking_filter.max_draft_pick),
        min_minutes_played: args.min_minutes.or(config.ranking_filter.min_minutes_played),
    };
    let top_k = args.top.unwrap_or(config.top_k).max(1);

    let data = pipeline::build_from_config(&config)?;
    for err in &data.errors {
        eprintln!("[WARN] {err}");
    }

    let comparison = match compare(&data.table, &query, top_k, &filter) {
        Ok(comparison) => comparison,
        Err(RankError::EmptyTable) => {
            println!("No players to compare against.");
            return Ok(());
        }
        Err(err @ RankError::InvalidQuery { .. }) => {
            return Err(anyhow!("{err}; provide all five measurements"));
        }
    };

    println!(
        "{:<4}{:<28}{:<10}{:>10}",
        "#", "Player", "Season", "Distance"
    );
    for (idx, (record, distance)) in comparison.top.iter().enumerate() {
        println!(
            "{:<4}{:<28}{:<10}{:>10.4}",
            idx + 1,
            record.player_name,
            record.season.label(),
            distance
        );
    }

    println!();
    println!("Averages across top {}:", comparison.top.len());
    for avg in &comparison.averages {
        let value = avg.mean.map_or("-".to_string(), |v| format!("{v:.2}"));
        println!("  {:<28}{value}", avg.measurement.column());
    }

    if let Some(path) = args.export.as_ref() {
        let report =
            export::export_comparison(path, &data.table, &comparison.ranked, &comparison.averages)?;
        println!(
            "Exported {} players / {} ranked rows to {}",
            report.players,
            report.ranked,
            path.display()
        );
    }

    Ok(())
}
