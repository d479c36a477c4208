use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::combine_dataset;
use crate::combine_fetch::{self, SeasonFetch};
use crate::config::{Config, DataSource};
use crate::enrichment::{StaticEnrichment, enrich_table};
use crate::merge::clean_and_merge;
use crate::normalize::normalize_seasons;
use crate::records::{CanonicalTable, Season, SeasonBatches};
use crate::synthetic;

pub const SYNTHETIC_SEED: u64 = 2026;
pub const SYNTHETIC_PLAYERS_PER_SEASON: usize = 60;

/// Everything the ranking surfaces need, built once at startup.
#[derive(Debug, Clone)]
pub struct CombineData {
    pub table: CanonicalTable,
    pub source: DataSource,
    pub seasons_loaded: usize,
    pub errors: Vec<String>,
}

/// Normalize the raw batches and collapse them into the canonical table.
pub fn build_canonical_table(seasons: &[SeasonBatches]) -> CanonicalTable {
    let feeds = normalize_seasons(seasons);
    clean_and_merge(&feeds)
}

pub fn load_seasons(config: &Config) -> Result<SeasonFetch> {
    let seasons = config.seasons();
    match config.source {
        DataSource::Synthetic => Ok(SeasonFetch {
            seasons: synthetic::generate_seasons(
                SYNTHETIC_SEED,
                &seasons,
                SYNTHETIC_PLAYERS_PER_SEASON,
            ),
            errors: Vec::new(),
        }),
        DataSource::Nba => Ok(combine_fetch::fetch_seasons(
            &seasons,
            config.fetch_parallelism,
            config.request_timeout_secs,
        )),
        DataSource::Db => load_from_db_or_fetch(config),
    }
}

fn load_from_db_or_fetch(config: &Config) -> Result<SeasonFetch> {
    let seasons = config.seasons();
    let Some(path) = config.db_path.as_ref() else {
        warn!("no cache dir for combine db, fetching live");
        return Ok(combine_fetch::fetch_seasons(
            &seasons,
            config.fetch_parallelism,
            config.request_timeout_secs,
        ));
    };
    let mut conn = combine_dataset::open_db(path)?;
    let mut stored = combine_dataset::load_season_batches(&conn, &seasons)?;
    let missing: Vec<Season> = seasons
        .iter()
        .filter(|s| !stored.iter().any(|b| &b.season == *s))
        .cloned()
        .collect();
    if missing.is_empty() {
        info!(seasons = stored.len(), db = %path.display(), "loaded stored combine batches");
        return Ok(SeasonFetch {
            seasons: stored,
            errors: Vec::new(),
        });
    }

    info!(
        stored = stored.len(),
        missing = missing.len(),
        db = %path.display(),
        "fetching combine seasons missing from db"
    );
    let fetched = combine_fetch::fetch_seasons(
        &missing,
        config.fetch_parallelism,
        config.request_timeout_secs,
    );
    combine_dataset::store_seasons(&mut conn, &fetched.seasons)
        .context("store fetched combine batches")?;
    stored.extend(fetched.seasons);
    stored.sort_by_key(|s| s.season.start_year());
    Ok(SeasonFetch {
        seasons: stored,
        errors: fetched.errors,
    })
}

/// Load, merge and optionally enrich. Fetch failures for individual seasons
/// end up in `errors`; only storage/config failures are returned as `Err`.
pub fn build_from_config(config: &Config) -> Result<CombineData> {
    let fetched = load_seasons(config)?;
    let mut table = build_canonical_table(&fetched.seasons);
    if let Some(path) = config.enrichment_path.as_ref() {
        let source = StaticEnrichment::load(path)?;
        table = enrich_table(&table, &source);
    }
    Ok(CombineData {
        table,
        source: config.source,
        seasons_loaded: fetched.seasons.len(),
        errors: fetched.errors,
    })
}
