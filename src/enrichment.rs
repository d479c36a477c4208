use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::records::{CanonicalTable, PlayerAttributes, RankedResult};

/// Source of extra per-player attributes (draft pick, minutes played).
pub trait Enrichment {
    fn attributes_for(&self, player_name: &str) -> Option<PlayerAttributes>;
}

/// Attributes keyed by player name, typically loaded from a JSON file shaped
/// like `{"Player Name": {"draft_pick": 3, "minutes_played": 1200.0}}`.
#[derive(Debug, Clone, Default)]
pub struct StaticEnrichment {
    players: HashMap<String, PlayerAttributes>,
}

impl StaticEnrichment {
    pub fn new(players: HashMap<String, PlayerAttributes>) -> Self {
        Self { players }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        let players: HashMap<String, PlayerAttributes> =
            serde_json::from_str(trimmed).context("invalid enrichment json")?;
        Ok(Self { players })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read enrichment file {}", path.display()))?;
        let source = Self::from_json(&raw)?;
        info!(players = source.players.len(), path = %path.display(), "loaded enrichment");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Enrichment for StaticEnrichment {
    fn attributes_for(&self, player_name: &str) -> Option<PlayerAttributes> {
        self.players.get(player_name).cloned()
    }
}

/// Returns a new table with attributes attached. Rows and order are unchanged.
pub fn enrich_table(table: &CanonicalTable, source: &dyn Enrichment) -> CanonicalTable {
    let records = table
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if let Some(attrs) = source.attributes_for(&record.player_name) {
                record.attributes = attrs;
            }
            record
        })
        .collect();
    CanonicalTable::new(records)
}

/// Post-ranking filter over enrichment attributes. A player lacking an
/// attribute a bound refers to is excluded by that bound.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingFilter {
    pub max_draft_pick: Option<u32>,
    pub min_minutes_played: Option<f64>,
}

impl RankingFilter {
    pub fn is_active(&self) -> bool {
        self.max_draft_pick.is_some() || self.min_minutes_played.is_some()
    }

    pub fn accepts(&self, attrs: &PlayerAttributes) -> bool {
        if let Some(max_pick) = self.max_draft_pick
            && !attrs.draft_pick.is_some_and(|pick| pick <= max_pick)
        {
            return false;
        }
        if let Some(min_minutes) = self.min_minutes_played
            && !attrs.minutes_played.is_some_and(|m| m >= min_minutes)
        {
            return false;
        }
        true
    }

    /// Keeps ranking order; distances are untouched.
    pub fn apply(&self, table: &CanonicalTable, ranked: Vec<RankedResult>) -> Vec<RankedResult> {
        if !self.is_active() {
            return ranked;
        }
        ranked
            .into_iter()
            .filter(|r| {
                table
                    .get(&r.player_name)
                    .is_some_and(|record| self.accepts(&record.attributes))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{RankingFilter, StaticEnrichment};
    use crate::enrichment::Enrichment;
    use crate::records::PlayerAttributes;

    #[test]
    fn parses_attribute_file() {
        let raw = r#"{"Jalen Fox": {"draft_pick": 4}, "Omar Hill": {"minutes_played": 812.5}}"#;
        let source = StaticEnrichment::from_json(raw).expect("valid json");
        assert_eq!(source.len(), 2);
        assert_eq!(
            source.attributes_for("Jalen Fox").and_then(|a| a.draft_pick),
            Some(4)
        );
        assert!(source.attributes_for("Nobody").is_none());
    }

    #[test]
    fn filter_requires_attributes_it_bounds() {
        let filter = RankingFilter {
            max_draft_pick: Some(14),
            min_minutes_played: None,
        };
        assert!(filter.accepts(&PlayerAttributes {
            draft_pick: Some(3),
            minutes_played: None,
        }));
        assert!(!filter.accepts(&PlayerAttributes {
            draft_pick: Some(31),
            minutes_played: None,
        }));
        assert!(!filter.accepts(&PlayerAttributes::default()));
        assert!(RankingFilter::default().accepts(&PlayerAttributes::default()));
    }
}
