use std::env;
use std::path::PathBuf;

use crate::enrichment::RankingFilter;
use crate::records::Season;

pub const DEFAULT_FIRST_SEASON: i32 = 2000;
pub const DEFAULT_LAST_SEASON: i32 = 2024;
pub const DEFAULT_TOP_K: usize = 6;

const APP_DIR: &str = "combine_comps";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Stored batches, falling back to a live fetch when the DB is empty.
    Db,
    Nba,
    Synthetic,
}

impl DataSource {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "db" | "sqlite" | "cache" => Some(DataSource::Db),
            "nba" | "live" => Some(DataSource::Nba),
            "synthetic" | "fake" | "offline" => Some(DataSource::Synthetic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub first_season: i32,
    pub last_season: i32,
    pub top_k: usize,
    pub fetch_parallelism: usize,
    pub request_timeout_secs: u64,
    pub db_path: Option<PathBuf>,
    pub source: DataSource,
    pub enrichment_path: Option<PathBuf>,
    /// Post-ranking bounds over enrichment attributes.
    pub ranking_filter: RankingFilter,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_season: DEFAULT_FIRST_SEASON,
            last_season: DEFAULT_LAST_SEASON,
            top_k: DEFAULT_TOP_K,
            fetch_parallelism: 6,
            request_timeout_secs: 15,
            db_path: default_db_path(),
            source: DataSource::Db,
            enrichment_path: None,
            ranking_filter: RankingFilter::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment; call `dotenvy` first to pick up `.env`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let first_season = env_parse("COMBINE_FIRST_SEASON").unwrap_or(defaults.first_season);
        let last_season = env_parse("COMBINE_LAST_SEASON")
            .unwrap_or(defaults.last_season)
            .max(first_season);
        Self {
            first_season,
            last_season,
            top_k: env_parse("COMBINE_TOP_K")
                .unwrap_or(defaults.top_k)
                .clamp(1, 50),
            fetch_parallelism: env_parse("FETCH_PARALLELISM")
                .unwrap_or(defaults.fetch_parallelism)
                .clamp(1, 16),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs)
                .max(1),
            db_path: env_path("COMBINE_DB_PATH").or(defaults.db_path),
            source: env::var("COMBINE_SOURCE")
                .ok()
                .and_then(|raw| DataSource::parse(&raw))
                .unwrap_or(defaults.source),
            enrichment_path: env_path("COMBINE_ENRICHMENT_PATH"),
            ranking_filter: RankingFilter {
                max_draft_pick: env_parse("COMBINE_MAX_PICK"),
                min_minutes_played: env_parse::<f64>("COMBINE_MIN_MINUTES")
                    .filter(|m| m.is_finite()),
            },
            log_filter: env::var("COMBINE_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    pub fn seasons(&self) -> Vec<Season> {
        season_range(self.first_season, self.last_season)
    }
}

/// Inclusive range of start years as season labels.
pub fn season_range(first: i32, last: i32) -> Vec<Season> {
    (first..=last).map(Season::from_start_year).collect()
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("draft_combine.sqlite"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
