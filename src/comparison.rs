use crate::enrichment::RankingFilter;
use crate::error::RankError;
use crate::records::{CanonicalPlayerRecord, CanonicalTable, QueryVector, RankedResult};
use crate::similarity::{MeasurementAverage, average_measurements, calculate_player_distances};

/// A ranked query plus what the surfaces display from it.
#[derive(Debug, Clone)]
pub struct Comparison<'a> {
    /// Full ranking after `filter`; distances are computed against the whole table.
    pub ranked: Vec<RankedResult>,
    pub top: Vec<(&'a CanonicalPlayerRecord, f64)>,
    pub averages: Vec<MeasurementAverage>,
}

pub fn compare<'a>(
    table: &'a CanonicalTable,
    query: &QueryVector,
    top_k: usize,
    filter: &RankingFilter,
) -> Result<Comparison<'a>, RankError> {
    let ranked = filter.apply(table, calculate_player_distances(table, query)?);
    let top: Vec<(&CanonicalPlayerRecord, f64)> = ranked
        .iter()
        .filter_map(|r| table.get(&r.player_name).map(|record| (record, r.distance)))
        .take(top_k)
        .collect();
    let top_records: Vec<&CanonicalPlayerRecord> = top.iter().map(|(record, _)| *record).collect();
    let averages = average_measurements(&top_records);
    Ok(Comparison {
        ranked,
        top,
        averages,
    })
}
