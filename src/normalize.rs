use serde_json::Value;
use tracing::debug;

use crate::records::{
    AnthroRow, Anthropometrics, DrillResults, DrillRow, HEIGHT_WO_SHOES_FT_IN, Measurement,
    PLAYER_NAME, POSITION, RawBatch, STANDING_REACH_FT_IN, SeasonBatches, WINGSPAN_FT_IN,
};

/// Placeholder strings the combine feeds use for "not measured".
const MISSING_SENTINELS: &[&str] = &["", "-", "--", "n/a", "na", "nan", "null", "none", "dnp"];

#[derive(Debug, Clone, Default)]
pub struct NormalizedFeeds {
    pub anthro: Vec<AnthroRow>,
    pub drill: Vec<DrillRow>,
}

pub fn normalize_seasons(seasons: &[SeasonBatches]) -> NormalizedFeeds {
    let anthro_batches: Vec<&RawBatch> = seasons.iter().map(|s| &s.anthro).collect();
    let drill_batches: Vec<&RawBatch> = seasons.iter().map(|s| &s.drill).collect();
    NormalizedFeeds {
        anthro: normalize_anthro_batches(anthro_batches),
        drill: normalize_drill_batches(drill_batches),
    }
}

pub fn normalize_anthro_batches<'a>(
    batches: impl IntoIterator<Item = &'a RawBatch>,
) -> Vec<AnthroRow> {
    let mut out = Vec::new();
    for batch in batches {
        if !batch_has_data(batch) {
            debug!(season = %batch.season, feed = batch.feed.key(), "skipping empty batch");
            continue;
        }
        let cols = ColumnMap::new(batch, &Measurement::ANTHRO);
        let position = batch.column_index(POSITION);
        let height_ft_in = batch.column_index(HEIGHT_WO_SHOES_FT_IN);
        let wingspan_ft_in = batch.column_index(WINGSPAN_FT_IN);
        let reach_ft_in = batch.column_index(STANDING_REACH_FT_IN);

        for row in &batch.rows {
            let Some(player_name) = cols.player_name(row) else {
                debug!(season = %batch.season, "skipping anthro row without player name");
                continue;
            };
            let mut values = Anthropometrics::default();
            for (m, idx) in &cols.measurements {
                values.set(*m, idx.and_then(|i| row.get(i)).and_then(coerce_number));
            }
            out.push(AnthroRow {
                player_name,
                season: batch.season.clone(),
                position: text_at(row, position),
                height_wo_shoes_ft_in: text_at(row, height_ft_in),
                wingspan_ft_in: text_at(row, wingspan_ft_in),
                standing_reach_ft_in: text_at(row, reach_ft_in),
                values,
            });
        }
    }
    out
}

pub fn normalize_drill_batches<'a>(
    batches: impl IntoIterator<Item = &'a RawBatch>,
) -> Vec<DrillRow> {
    let mut out = Vec::new();
    for batch in batches {
        if !batch_has_data(batch) {
            debug!(season = %batch.season, feed = batch.feed.key(), "skipping empty batch");
            continue;
        }
        let cols = ColumnMap::new(batch, &Measurement::DRILL);
        for row in &batch.rows {
            let Some(player_name) = cols.player_name(row) else {
                debug!(season = %batch.season, "skipping drill row without player name");
                continue;
            };
            let mut values = DrillResults::default();
            for (m, idx) in &cols.measurements {
                values.set(*m, idx.and_then(|i| row.get(i)).and_then(coerce_number));
            }
            out.push(DrillRow {
                player_name,
                season: batch.season.clone(),
                values,
            });
        }
    }
    out
}

/// Coerce a raw cell to a finite number. Anything else is "missing".
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if is_sentinel(trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Coerce a raw cell to display text, treating sentinels as missing.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if is_sentinel(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_sentinel(raw: &str) -> bool {
    MISSING_SENTINELS
        .iter()
        .any(|s| raw.eq_ignore_ascii_case(s))
}

fn is_missing_cell(value: &Value) -> bool {
    coerce_text(value).is_none()
}

/// False for empty batches and batches in which every row is all-missing.
fn batch_has_data(batch: &RawBatch) -> bool {
    batch
        .rows
        .iter()
        .any(|row| !row.iter().all(is_missing_cell))
}

fn text_at(row: &[Value], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i)).and_then(coerce_text)
}

struct ColumnMap {
    player_name: Option<usize>,
    measurements: Vec<(Measurement, Option<usize>)>,
}

impl ColumnMap {
    fn new(batch: &RawBatch, measurements: &[Measurement]) -> Self {
        Self {
            player_name: batch.column_index(PLAYER_NAME),
            measurements: measurements
                .iter()
                .map(|m| (*m, batch.column_index(m.column())))
                .collect(),
        }
    }

    fn player_name(&self, row: &[Value]) -> Option<String> {
        text_at(row, self.player_name)
    }
}
