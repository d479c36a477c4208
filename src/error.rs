use thiserror::Error;

use crate::records::Feature;

/// Outcomes that stop a ranking request. Both are caller-recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    #[error("incomplete query, missing: {}", join_features(.missing))]
    InvalidQuery { missing: Vec<Feature> },

    #[error("no players to compare against")]
    EmptyTable,
}

impl RankError {
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, RankError::InvalidQuery { .. })
    }
}

fn join_features(features: &[Feature]) -> String {
    features
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ")
}
