use std::cmp::Ordering;

use tracing::debug;

use crate::error::RankError;
use crate::records::{
    CanonicalPlayerRecord, CanonicalTable, Measurement, PhysicalProfile, QueryVector,
    REQUIRED_FEATURES, RankedResult,
};

/// Standard deviations below this are treated as zero.
const STD_EPSILON: f64 = 1e-9;

const FEATURE_COUNT: usize = REQUIRED_FEATURES.len();

/// Per-feature mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScale {
    pub mean: f64,
    pub std: f64,
}

impl FeatureScale {
    fn fit(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self { mean: 0.0, std: 0.0 };
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let var = finite
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        Self {
            mean,
            std: var.sqrt(),
        }
    }

    /// Zero-variance features scale to 0 for every input.
    pub fn transform(&self, value: f64) -> f64 {
        if self.std < STD_EPSILON {
            return 0.0;
        }
        (value - self.mean) / self.std
    }
}

/// Standardization fitted on the canonical table, one scale per required feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    pub scales: [FeatureScale; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn fit(profiles: &[PhysicalProfile]) -> Self {
        let scales = std::array::from_fn(|i| {
            let feature = REQUIRED_FEATURES[i];
            let column: Vec<f64> = profiles.iter().map(|p| p.get(feature)).collect();
            FeatureScale::fit(&column)
        });
        Self { scales }
    }

    pub fn transform(&self, profile: &PhysicalProfile) -> [f64; FEATURE_COUNT] {
        let raw = profile.to_array();
        std::array::from_fn(|i| self.scales[i].transform(raw[i]))
    }
}

/// Standardized Euclidean distance from `query` to every canonical player,
/// closest first. Equal distances keep table order.
pub fn calculate_player_distances(
    table: &CanonicalTable,
    query: &QueryVector,
) -> Result<Vec<RankedResult>, RankError> {
    let query = query.validate()?;
    if table.is_empty() {
        return Err(RankError::EmptyTable);
    }

    let profiles: Vec<PhysicalProfile> = table.iter().map(|r| r.profile).collect();
    let scaler = StandardScaler::fit(&profiles);
    let scaled_query = scaler.transform(&query);

    let mut ranked: Vec<RankedResult> = table
        .iter()
        .zip(&profiles)
        .map(|(record, profile)| RankedResult {
            player_name: record.player_name.clone(),
            season: record.season.clone(),
            distance: euclidean(&scaler.transform(profile), &scaled_query),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    debug!(candidates = ranked.len(), "ranked combine comparison");
    Ok(ranked)
}

/// Non-finite dimensions are skipped instead of poisoning the sum.
fn euclidean(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .filter(|d| d.is_finite())
        .map(|d| d * d)
        .sum::<f64>()
        .sqrt()
}

/// The `k` closest canonical records, in ranking order.
pub fn closest_players<'a>(
    table: &'a CanonicalTable,
    ranked: &[RankedResult],
    k: usize,
) -> Vec<&'a CanonicalPlayerRecord> {
    ranked
        .iter()
        .filter_map(|r| table.get(&r.player_name))
        .take(k)
        .collect()
}

/// Mean of one measurement over a set of players, rounded to 2 decimals
/// (ties to even).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementAverage {
    pub measurement: Measurement,
    pub mean: Option<f64>,
}

/// Averages every numeric column across `players`, ignoring missing values.
/// A column no player has stays `None`.
pub fn average_measurements(players: &[&CanonicalPlayerRecord]) -> Vec<MeasurementAverage> {
    Measurement::ALL
        .into_iter()
        .map(|m| {
            let values: Vec<f64> = players.iter().filter_map(|p| p.measurement(m)).collect();
            let mean = if values.is_empty() {
                None
            } else {
                Some(round2(values.iter().sum::<f64>() / values.len() as f64))
            };
            MeasurementAverage {
                measurement: m,
                mean,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
