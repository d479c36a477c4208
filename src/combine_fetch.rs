use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::http_client::http_client;
use crate::records::{Feed, RawBatch, Season, SeasonBatches};

const ANTHRO_URL: &str = "https://stats.nba.com/stats/draftcombineplayeranthro";
const DRILL_URL: &str = "https://stats.nba.com/stats/draftcombinedrillresults";

#[derive(Debug, Clone, Default)]
pub struct SeasonFetch {
    pub seasons: Vec<SeasonBatches>,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default, deserialize_with = "vec_or_default")]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default, deserialize_with = "vec_or_default")]
    row_set: Vec<Vec<Value>>,
}

pub fn combine_url(feed: Feed, season: &Season) -> String {
    let base = match feed {
        Feed::Anthro => ANTHRO_URL,
        Feed::Drill => DRILL_URL,
    };
    format!("{base}?LeagueID=00&SeasonYear={}", season.label())
}

/// Fetch every season pair on a bounded pool. Failed seasons are reported in
/// `errors` and left out; the result keeps `seasons` order.
pub fn fetch_seasons(seasons: &[Season], parallelism: usize, timeout_secs: u64) -> SeasonFetch {
    let client = match http_client(timeout_secs) {
        Ok(client) => client,
        Err(err) => {
            return SeasonFetch {
                seasons: Vec::new(),
                errors: vec![format!("combine client build failed: {err}")],
            };
        }
    };

    let results: Vec<Result<SeasonBatches>> = with_fetch_pool(parallelism, || {
        seasons
            .par_iter()
            .map(|season| fetch_season(client, season))
            .collect()
    });

    let mut out = SeasonFetch::default();
    for (season, result) in seasons.iter().zip(results) {
        match result {
            Ok(batches) => out.seasons.push(batches),
            Err(err) => {
                warn!(season = %season, "combine fetch failed: {err:#}");
                out.errors.push(format!("season {season}: {err:#}"));
            }
        }
    }
    info!(
        fetched = out.seasons.len(),
        failed = out.errors.len(),
        "combine fetch finished"
    );
    out
}

pub fn fetch_season(client: &Client, season: &Season) -> Result<SeasonBatches> {
    let anthro = fetch_batch(client, Feed::Anthro, season)?;
    let drill = fetch_batch(client, Feed::Drill, season)?;
    Ok(SeasonBatches {
        season: season.clone(),
        anthro,
        drill,
    })
}

pub fn fetch_batch(client: &Client, feed: Feed, season: &Season) -> Result<RawBatch> {
    let url = combine_url(feed, season);
    let resp = client.get(&url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {} for {} {}", status, feed.key(), season));
    }
    parse_result_set_json(&body, season.clone(), feed)
}

/// Parse a stats response (`resultSets[0]` or `resultSet`) into a batch.
/// Empty and `null` bodies give an empty batch.
pub fn parse_result_set_json(raw: &str, season: Season, feed: Feed) -> Result<RawBatch> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RawBatch::empty(season, feed));
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid stats json")?;
    let set_value = root
        .get("resultSets")
        .and_then(|v| v.as_array())
        .and_then(|sets| sets.first())
        .or_else(|| root.get("resultSet"));
    let Some(set_value) = set_value else {
        return Ok(RawBatch::empty(season, feed));
    };
    let set = ResultSet::deserialize(set_value).context("invalid result set")?;
    let width = set.headers.len();
    let rows = set
        .row_set
        .into_iter()
        .map(|mut row| {
            row.resize(width.max(row.len()), Value::Null);
            row
        })
        .collect();
    Ok(RawBatch {
        season,
        feed,
        headers: set.headers,
        rows,
    })
}

fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 16))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
