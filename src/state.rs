use crate::comparison::compare;
use crate::enrichment::RankingFilter;
use crate::error::RankError;
use crate::records::{CanonicalPlayerRecord, CanonicalTable, Feature, QueryVector, REQUIRED_FEATURES};
use crate::similarity::MeasurementAverage;

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntry {
    pub distance: f64,
    pub record: CanonicalPlayerRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    /// Neutral "provide all fields" state; nothing was computed.
    NeedsInput { missing: Vec<Feature> },
    NoCandidates,
    Ranked {
        top: Vec<TopEntry>,
        averages: Vec<MeasurementAverage>,
        total: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub inputs: [String; 5],
    pub focus: usize,
    pub selected: usize,
    pub top_k: usize,
    pub filter: RankingFilter,
    pub outcome: Outcome,
    pub help_overlay: bool,
}

impl DashboardState {
    pub fn new(top_k: usize) -> Self {
        Self {
            inputs: Default::default(),
            focus: 0,
            selected: 0,
            top_k: top_k.max(1),
            filter: RankingFilter::default(),
            outcome: Outcome::Idle,
            help_overlay: false,
        }
    }

    pub fn with_filter(mut self, filter: RankingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn focused_feature(&self) -> Feature {
        REQUIRED_FEATURES[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % REQUIRED_FEATURES.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + REQUIRED_FEATURES.len() - 1) % REQUIRED_FEATURES.len();
    }

    /// Only digits and a single decimal point are accepted.
    pub fn push_char(&mut self, c: char) {
        let field = &mut self.inputs[self.focus];
        if c.is_ascii_digit() || (c == '.' && !field.contains('.')) {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.inputs[self.focus].pop();
    }

    pub fn clear_inputs(&mut self) {
        self.inputs = Default::default();
        self.focus = 0;
        self.selected = 0;
        self.outcome = Outcome::Idle;
    }

    pub fn query(&self) -> QueryVector {
        let mut q = QueryVector::default();
        for (feature, raw) in REQUIRED_FEATURES.iter().zip(&self.inputs) {
            q.set(*feature, raw.trim().parse::<f64>().ok());
        }
        q
    }

    pub fn set_query(&mut self, query: &QueryVector) {
        for (idx, feature) in REQUIRED_FEATURES.iter().enumerate() {
            self.inputs[idx] = query.get(*feature).map(|v| v.to_string()).unwrap_or_default();
        }
    }

    pub fn submit(&mut self, table: &CanonicalTable) {
        self.selected = 0;
        self.outcome = match compare(table, &self.query(), self.top_k, &self.filter) {
            Ok(comparison) => Outcome::Ranked {
                total: comparison.ranked.len(),
                top: comparison
                    .top
                    .into_iter()
                    .map(|(record, distance)| TopEntry {
                        distance,
                        record: record.clone(),
                    })
                    .collect(),
                averages: comparison.averages,
            },
            Err(RankError::InvalidQuery { missing }) => Outcome::NeedsInput { missing },
            Err(RankError::EmptyTable) => Outcome::NoCandidates,
        };
    }

    pub fn select_next(&mut self) {
        if let Outcome::Ranked { top, .. } = &self.outcome
            && !top.is_empty()
        {
            self.selected = (self.selected + 1).min(top.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_entry(&self) -> Option<&TopEntry> {
        match &self.outcome {
            Outcome::Ranked { top, .. } => top.get(self.selected),
            _ => None,
        }
    }
}
