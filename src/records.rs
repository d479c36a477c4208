use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RankError;

pub const PLAYER_NAME: &str = "PLAYER_NAME";
pub const POSITION: &str = "POSITION";
pub const HEIGHT_WO_SHOES_FT_IN: &str = "HEIGHT_WO_SHOES_FT_IN";
pub const WINGSPAN_FT_IN: &str = "WINGSPAN_FT_IN";
pub const STANDING_REACH_FT_IN: &str = "STANDING_REACH_FT_IN";

/// Season label such as `2019-20`. Ordering between seasons goes through
/// [`Season::start_year`], never through the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Season(String);

impl Season {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    /// `2019` -> `2019-20`, `1999` -> `1999-00`.
    pub fn from_start_year(year: i32) -> Self {
        Self(format!("{year}-{:02}", (year + 1).rem_euclid(100)))
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Leading year token of the label, e.g. `2019` for `2019-20`.
    pub fn start_year(&self) -> Option<i32> {
        let token: String = self
            .0
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        token.parse::<i32>().ok()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feed {
    Anthro,
    Drill,
}

impl Feed {
    pub fn key(self) -> &'static str {
        match self {
            Feed::Anthro => "anthro",
            Feed::Drill => "drill",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        match raw {
            "anthro" => Some(Feed::Anthro),
            "drill" => Some(Feed::Drill),
            _ => None,
        }
    }
}

/// One untyped table as delivered by a feed: named columns, heterogeneous cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    pub season: Season,
    pub feed: Feed,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawBatch {
    pub fn empty(season: Season, feed: Feed) -> Self {
        Self {
            season,
            feed,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The anthropometric and drill batches fetched for one season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonBatches {
    pub season: Season,
    pub anthro: RawBatch,
    pub drill: RawBatch,
}

/// The five measurements every comparison is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    HeightWoShoes,
    Wingspan,
    StandingReach,
    HandLength,
    HandWidth,
}

pub const REQUIRED_FEATURES: [Feature; 5] = [
    Feature::HeightWoShoes,
    Feature::Wingspan,
    Feature::StandingReach,
    Feature::HandLength,
    Feature::HandWidth,
];

impl Feature {
    pub fn measurement(self) -> Measurement {
        match self {
            Feature::HeightWoShoes => Measurement::HeightWoShoes,
            Feature::Wingspan => Measurement::Wingspan,
            Feature::StandingReach => Measurement::StandingReach,
            Feature::HandLength => Measurement::HandLength,
            Feature::HandWidth => Measurement::HandWidth,
        }
    }

    pub fn column(self) -> &'static str {
        self.measurement().column()
    }

    pub fn label(self) -> &'static str {
        self.measurement().label()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Every numeric column either feed carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    HeightWoShoes,
    Weight,
    Wingspan,
    StandingReach,
    HandLength,
    HandWidth,
    StandingVerticalLeap,
    MaxVerticalLeap,
    LaneAgilityTime,
    ModifiedLaneAgilityTime,
    ThreeQuarterSprint,
    BenchPress,
}

impl Measurement {
    pub const ANTHRO: [Measurement; 6] = [
        Measurement::HeightWoShoes,
        Measurement::Weight,
        Measurement::Wingspan,
        Measurement::StandingReach,
        Measurement::HandLength,
        Measurement::HandWidth,
    ];

    pub const DRILL: [Measurement; 6] = [
        Measurement::StandingVerticalLeap,
        Measurement::MaxVerticalLeap,
        Measurement::LaneAgilityTime,
        Measurement::ModifiedLaneAgilityTime,
        Measurement::ThreeQuarterSprint,
        Measurement::BenchPress,
    ];

    pub const ALL: [Measurement; 12] = [
        Measurement::HeightWoShoes,
        Measurement::Weight,
        Measurement::Wingspan,
        Measurement::StandingReach,
        Measurement::HandLength,
        Measurement::HandWidth,
        Measurement::StandingVerticalLeap,
        Measurement::MaxVerticalLeap,
        Measurement::LaneAgilityTime,
        Measurement::ModifiedLaneAgilityTime,
        Measurement::ThreeQuarterSprint,
        Measurement::BenchPress,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Measurement::HeightWoShoes => "HEIGHT_WO_SHOES",
            Measurement::Weight => "WEIGHT",
            Measurement::Wingspan => "WINGSPAN",
            Measurement::StandingReach => "STANDING_REACH",
            Measurement::HandLength => "HAND_LENGTH",
            Measurement::HandWidth => "HAND_WIDTH",
            Measurement::StandingVerticalLeap => "STANDING_VERTICAL_LEAP",
            Measurement::MaxVerticalLeap => "MAX_VERTICAL_LEAP",
            Measurement::LaneAgilityTime => "LANE_AGILITY_TIME",
            Measurement::ModifiedLaneAgilityTime => "MODIFIED_LANE_AGILITY_TIME",
            Measurement::ThreeQuarterSprint => "THREE_QUARTER_SPRINT",
            Measurement::BenchPress => "BENCH_PRESS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measurement::HeightWoShoes => "Height w/o shoes",
            Measurement::Weight => "Weight",
            Measurement::Wingspan => "Wingspan",
            Measurement::StandingReach => "Standing reach",
            Measurement::HandLength => "Hand length",
            Measurement::HandWidth => "Hand width",
            Measurement::StandingVerticalLeap => "Standing vert",
            Measurement::MaxVerticalLeap => "Max vert",
            Measurement::LaneAgilityTime => "Lane agility",
            Measurement::ModifiedLaneAgilityTime => "Mod. lane agility",
            Measurement::ThreeQuarterSprint => "3/4 sprint",
            Measurement::BenchPress => "Bench press",
        }
    }

    pub fn feed(self) -> Feed {
        if Self::ANTHRO.contains(&self) {
            Feed::Anthro
        } else {
            Feed::Drill
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anthropometrics {
    pub height_wo_shoes: Option<f64>,
    pub weight: Option<f64>,
    pub wingspan: Option<f64>,
    pub standing_reach: Option<f64>,
    pub hand_length: Option<f64>,
    pub hand_width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillResults {
    pub standing_vertical_leap: Option<f64>,
    pub max_vertical_leap: Option<f64>,
    pub lane_agility_time: Option<f64>,
    pub modified_lane_agility_time: Option<f64>,
    pub three_quarter_sprint: Option<f64>,
    pub bench_press: Option<f64>,
}

impl DrillResults {
    pub fn get(&self, m: Measurement) -> Option<f64> {
        match m {
            Measurement::StandingVerticalLeap => self.standing_vertical_leap,
            Measurement::MaxVerticalLeap => self.max_vertical_leap,
            Measurement::LaneAgilityTime => self.lane_agility_time,
            Measurement::ModifiedLaneAgilityTime => self.modified_lane_agility_time,
            Measurement::ThreeQuarterSprint => self.three_quarter_sprint,
            Measurement::BenchPress => self.bench_press,
            _ => None,
        }
    }

    pub fn set(&mut self, m: Measurement, value: Option<f64>) {
        match m {
            Measurement::StandingVerticalLeap => self.standing_vertical_leap = value,
            Measurement::MaxVerticalLeap => self.max_vertical_leap = value,
            Measurement::LaneAgilityTime => self.lane_agility_time = value,
            Measurement::ModifiedLaneAgilityTime => self.modified_lane_agility_time = value,
            Measurement::ThreeQuarterSprint => self.three_quarter_sprint = value,
            Measurement::BenchPress => self.bench_press = value,
            _ => {}
        }
    }
}

impl Anthropometrics {
    pub fn get(&self, m: Measurement) -> Option<f64> {
        match m {
            Measurement::HeightWoShoes => self.height_wo_shoes,
            Measurement::Weight => self.weight,
            Measurement::Wingspan => self.wingspan,
            Measurement::StandingReach => self.standing_reach,
            Measurement::HandLength => self.hand_length,
            Measurement::HandWidth => self.hand_width,
            _ => None,
        }
    }

    pub fn set(&mut self, m: Measurement, value: Option<f64>) {
        match m {
            Measurement::HeightWoShoes => self.height_wo_shoes = value,
            Measurement::Weight => self.weight = value,
            Measurement::Wingspan => self.wingspan = value,
            Measurement::StandingReach => self.standing_reach = value,
            Measurement::HandLength => self.hand_length = value,
            Measurement::HandWidth => self.hand_width = value,
            _ => {}
        }
    }
}

/// Normalized anthropometric row (one per player per season).
#[derive(Debug, Clone, PartialEq)]
pub struct AnthroRow {
    pub player_name: String,
    pub season: Season,
    pub position: Option<String>,
    pub height_wo_shoes_ft_in: Option<String>,
    pub wingspan_ft_in: Option<String>,
    pub standing_reach_ft_in: Option<String>,
    pub values: Anthropometrics,
}

/// Normalized drill row (one per player per season).
#[derive(Debug, Clone, PartialEq)]
pub struct DrillRow {
    pub player_name: String,
    pub season: Season,
    pub values: DrillResults,
}

/// Joined anthropometric + drill data for a single (player, season).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeasonRecord {
    pub player_name: String,
    pub season: Season,
    pub position: Option<String>,
    pub height_wo_shoes_ft_in: Option<String>,
    pub wingspan_ft_in: Option<String>,
    pub standing_reach_ft_in: Option<String>,
    pub anthro: Anthropometrics,
    pub drill: DrillResults,
}

impl PlayerSeasonRecord {
    pub fn measurement(&self, m: Measurement) -> Option<f64> {
        match m.feed() {
            Feed::Anthro => self.anthro.get(m),
            Feed::Drill => self.drill.get(m),
        }
    }

    pub fn set_measurement(&mut self, m: Measurement, value: Option<f64>) {
        match m.feed() {
            Feed::Anthro => self.anthro.set(m, value),
            Feed::Drill => self.drill.set(m, value),
        }
    }

    /// The five comparison features, or `None` if any is missing.
    pub fn profile(&self) -> Option<PhysicalProfile> {
        Some(PhysicalProfile {
            height_wo_shoes: self.anthro.height_wo_shoes?,
            wingspan: self.anthro.wingspan?,
            standing_reach: self.anthro.standing_reach?,
            hand_length: self.anthro.hand_length?,
            hand_width: self.anthro.hand_width?,
        })
    }
}

/// The five required measurements, all present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProfile {
    pub height_wo_shoes: f64,
    pub wingspan: f64,
    pub standing_reach: f64,
    pub hand_length: f64,
    pub hand_width: f64,
}

impl PhysicalProfile {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::HeightWoShoes => self.height_wo_shoes,
            Feature::Wingspan => self.wingspan,
            Feature::StandingReach => self.standing_reach,
            Feature::HandLength => self.hand_length,
            Feature::HandWidth => self.hand_width,
        }
    }

    /// Values in [`REQUIRED_FEATURES`] order.
    pub fn to_array(&self) -> [f64; 5] {
        REQUIRED_FEATURES.map(|f| self.get(f))
    }
}

/// Attributes an enrichment source may attach; they never affect distances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    #[serde(default)]
    pub draft_pick: Option<u32>,
    #[serde(default)]
    pub minutes_played: Option<f64>,
}

/// One deduplicated player. `season` is the most recent season observed.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalPlayerRecord {
    pub player_name: String,
    pub season: Season,
    pub seasons: Vec<Season>,
    pub position: Option<String>,
    pub height_wo_shoes_ft_in: Option<String>,
    pub wingspan_ft_in: Option<String>,
    pub standing_reach_ft_in: Option<String>,
    pub profile: PhysicalProfile,
    pub weight: Option<f64>,
    pub drill: DrillResults,
    pub attributes: PlayerAttributes,
}

impl CanonicalPlayerRecord {
    pub fn measurement(&self, m: Measurement) -> Option<f64> {
        match m {
            Measurement::HeightWoShoes => Some(self.profile.height_wo_shoes),
            Measurement::Wingspan => Some(self.profile.wingspan),
            Measurement::StandingReach => Some(self.profile.standing_reach),
            Measurement::HandLength => Some(self.profile.hand_length),
            Measurement::HandWidth => Some(self.profile.hand_width),
            Measurement::Weight => self.weight,
            other => self.drill.get(other),
        }
    }
}

/// Immutable table of canonical players, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    records: Vec<CanonicalPlayerRecord>,
    by_name: HashMap<String, usize>,
}

impl CanonicalTable {
    /// Callers are expected to pass unique names; later duplicates are dropped.
    pub fn new(records: Vec<CanonicalPlayerRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if by_name.contains_key(&record.player_name) {
                continue;
            }
            by_name.insert(record.player_name.clone(), unique.len());
            unique.push(record);
        }
        Self {
            records: unique,
            by_name,
        }
    }

    pub fn records(&self) -> &[CanonicalPlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, player_name: &str) -> Option<&CanonicalPlayerRecord> {
        self.by_name.get(player_name).map(|idx| &self.records[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPlayerRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<CanonicalPlayerRecord> {
        self.records
    }
}

/// Caller-supplied comparison point. Every field must be present to rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryVector {
    pub height_wo_shoes: Option<f64>,
    pub wingspan: Option<f64>,
    pub standing_reach: Option<f64>,
    pub hand_length: Option<f64>,
    pub hand_width: Option<f64>,
}

impl QueryVector {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::HeightWoShoes => self.height_wo_shoes,
            Feature::Wingspan => self.wingspan,
            Feature::StandingReach => self.standing_reach,
            Feature::HandLength => self.hand_length,
            Feature::HandWidth => self.hand_width,
        }
    }

    pub fn set(&mut self, feature: Feature, value: Option<f64>) {
        match feature {
            Feature::HeightWoShoes => self.height_wo_shoes = value,
            Feature::Wingspan => self.wingspan = value,
            Feature::StandingReach => self.standing_reach = value,
            Feature::HandLength => self.hand_length = value,
            Feature::HandWidth => self.hand_width = value,
        }
    }

    pub fn missing_features(&self) -> Vec<Feature> {
        REQUIRED_FEATURES
            .into_iter()
            .filter(|f| !self.get(*f).is_some_and(f64::is_finite))
            .collect()
    }

    pub fn validate(&self) -> Result<PhysicalProfile, RankError> {
        let missing = self.missing_features();
        if !missing.is_empty() {
            return Err(RankError::InvalidQuery { missing });
        }
        Ok(PhysicalProfile {
            height_wo_shoes: self.height_wo_shoes.unwrap_or_default(),
            wingspan: self.wingspan.unwrap_or_default(),
            standing_reach: self.standing_reach.unwrap_or_default(),
            hand_length: self.hand_length.unwrap_or_default(),
            hand_width: self.hand_width.unwrap_or_default(),
        })
    }
}

impl From<PhysicalProfile> for QueryVector {
    fn from(p: PhysicalProfile) -> Self {
        Self {
            height_wo_shoes: Some(p.height_wo_shoes),
            wingspan: Some(p.wingspan),
            standing_reach: Some(p.standing_reach),
            hand_length: Some(p.hand_length),
            hand_width: Some(p.hand_width),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub player_name: String,
    pub season: Season,
    pub distance: f64,
}
