use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::{info, warn};

use crate::combine_fetch;
use crate::records::{Feed, RawBatch, Season, SeasonBatches};

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub seasons_total: usize,
    pub seasons_succeeded: usize,
    pub rows_stored: usize,
    pub latest_season: Option<String>,
    pub errors: Vec<String>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS batches (
            season TEXT NOT NULL,
            start_year INTEGER NULL,
            feed TEXT NOT NULL,
            headers_json TEXT NOT NULL,
            rows_json TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            fetched_at TEXT NOT NULL,
            PRIMARY KEY (season, feed)
        );
        CREATE INDEX IF NOT EXISTS idx_batches_start_year ON batches(start_year);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            seasons_total INTEGER NOT NULL,
            seasons_succeeded INTEGER NOT NULL,
            rows_stored INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Fetch the given seasons and upsert whatever succeeded.
pub fn ingest_seasons(
    conn: &mut Connection,
    db_path: PathBuf,
    seasons: &[Season],
    parallelism: usize,
    timeout_secs: u64,
) -> Result<IngestSummary> {
    if seasons.is_empty() {
        return Err(anyhow!("no seasons passed to ingest"));
    }

    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, seasons_total, seasons_succeeded, rows_stored, errors_json)
         VALUES (?1, NULL, ?2, 0, 0, '[]')",
        params![started_at, seasons.len() as i64],
    )
    .context("insert ingest run")?;
    let run_id = conn.last_insert_rowid();

    let fetched = combine_fetch::fetch_seasons(seasons, parallelism, timeout_secs);
    let seasons_succeeded = fetched.seasons.len();
    let rows_stored = store_seasons(conn, &fetched.seasons)?;
    let errors = fetched.errors;

    let finished_at = Utc::now().to_rfc3339();
    let errors_json = serde_json::to_string(&errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, seasons_succeeded = ?2, rows_stored = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            seasons_succeeded as i64,
            rows_stored as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;

    let latest_season = conn
        .query_row(
            "SELECT season FROM batches ORDER BY start_year DESC LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .context("query latest season")?;

    info!(seasons_succeeded, rows_stored, "combine ingest stored");
    Ok(IngestSummary {
        db_path,
        seasons_total: seasons.len(),
        seasons_succeeded,
        rows_stored,
        latest_season,
        errors,
    })
}

/// Upsert both batches of every season in one transaction; returns rows stored.
pub fn store_seasons(conn: &mut Connection, seasons: &[SeasonBatches]) -> Result<usize> {
    let tx = conn.transaction().context("begin store transaction")?;
    let mut rows = 0usize;
    for season in seasons {
        rows += upsert_batch(&tx, &season.anthro)?;
        rows += upsert_batch(&tx, &season.drill)?;
    }
    tx.commit().context("commit store transaction")?;
    Ok(rows)
}

fn upsert_batch(conn: &Connection, batch: &RawBatch) -> Result<usize> {
    let headers_json = serde_json::to_string(&batch.headers).context("serialize headers")?;
    let rows_json = serde_json::to_string(&batch.rows).context("serialize rows")?;
    conn.execute(
        r#"
        INSERT INTO batches(season, start_year, feed, headers_json, rows_json, row_count, fetched_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(season, feed) DO UPDATE SET
            start_year = excluded.start_year,
            headers_json = excluded.headers_json,
            rows_json = excluded.rows_json,
            row_count = excluded.row_count,
            fetched_at = excluded.fetched_at
        "#,
        params![
            batch.season.label(),
            batch.season.start_year(),
            batch.feed.key(),
            headers_json,
            rows_json,
            batch.rows.len() as i64,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert {} batch {}", batch.feed.key(), batch.season))?;
    Ok(batch.rows.len())
}

/// Stored batches for `seasons`, paired by season, oldest first. A season
/// missing one feed gets an empty batch for it; seasons never stored are
/// absent from the result.
pub fn load_season_batches(conn: &Connection, seasons: &[Season]) -> Result<Vec<SeasonBatches>> {
    let wanted: HashSet<&str> = seasons.iter().map(|s| s.label()).collect();
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, feed, headers_json, rows_json
            FROM batches
            ORDER BY start_year ASC, season ASC
            "#,
        )
        .context("prepare load batches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .context("query load batches")?;

    let mut order: Vec<String> = Vec::new();
    let mut paired: BTreeMap<String, (Option<RawBatch>, Option<RawBatch>)> = BTreeMap::new();
    for row in rows {
        let (season, feed_key, headers_json, rows_json) = row.context("decode batch row")?;
        if !wanted.contains(season.as_str()) {
            continue;
        }
        let Some(feed) = Feed::from_key(&feed_key) else {
            warn!(feed = %feed_key, "ignoring stored batch with unknown feed");
            continue;
        };
        let headers: Vec<String> =
            serde_json::from_str(&headers_json).context("decode stored headers")?;
        let cells: Vec<Vec<Value>> =
            serde_json::from_str(&rows_json).context("decode stored rows")?;
        let batch = RawBatch {
            season: Season::new(season.clone()),
            feed,
            headers,
            rows: cells,
        };
        if !paired.contains_key(&season) {
            order.push(season.clone());
        }
        let slot = paired.entry(season).or_default();
        match feed {
            Feed::Anthro => slot.0 = Some(batch),
            Feed::Drill => slot.1 = Some(batch),
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for label in order {
        let Some((anthro, drill)) = paired.remove(&label) else {
            continue;
        };
        let season = Season::new(label);
        out.push(SeasonBatches {
            anthro: anthro.unwrap_or_else(|| RawBatch::empty(season.clone(), Feed::Anthro)),
            drill: drill.unwrap_or_else(|| RawBatch::empty(season.clone(), Feed::Drill)),
            season,
        });
    }
    Ok(out)
}
