use std::collections::HashMap;

use combine_comps::config::season_range;
use combine_comps::enrichment::{RankingFilter, StaticEnrichment, enrich_table};
use combine_comps::pipeline::build_canonical_table;
use combine_comps::records::{CanonicalTable, Feature, PlayerAttributes, QueryVector};
use combine_comps::state::{DashboardState, Outcome};
use combine_comps::synthetic::generate_seasons;

fn table() -> CanonicalTable {
    build_canonical_table(&generate_seasons(11, &season_range(2018, 2020), 30))
}

fn type_str(state: &mut DashboardState, raw: &str) {
    for c in raw.chars() {
        state.push_char(c);
    }
}

#[test]
fn incomplete_inputs_ask_for_the_rest() {
    let mut state = DashboardState::new(6);
    type_str(&mut state, "80");
    state.focus_next();
    type_str(&mut state, "85.5");
    state.submit(&table());
    assert_eq!(
        state.outcome,
        Outcome::NeedsInput {
            missing: vec![Feature::StandingReach, Feature::HandLength, Feature::HandWidth]
        }
    );
    assert!(state.selected_entry().is_none());
}

#[test]
fn empty_table_has_no_candidates() {
    let mut state = DashboardState::new(6);
    state.set_query(&QueryVector {
        height_wo_shoes: Some(80.0),
        wingspan: Some(85.0),
        standing_reach: Some(108.0),
        hand_length: Some(8.25),
        hand_width: Some(8.75),
    });
    state.submit(&CanonicalTable::default());
    assert_eq!(state.outcome, Outcome::NoCandidates);
}

#[test]
fn full_query_ranks_top_k() {
    let table = table();
    let target = table.records()[0].clone();
    let mut state = DashboardState::new(4);
    state.set_query(&QueryVector::from(target.profile));
    state.submit(&table);

    match &state.outcome {
        Outcome::Ranked {
            top,
            averages,
            total,
        } => {
            assert_eq!(top.len(), 4.min(table.len()));
            assert_eq!(*total, table.len());
            assert!(top[0].distance.abs() < 1e-9);
            assert!(top.windows(2).all(|w| w[0].distance <= w[1].distance));
            assert!(!averages.is_empty());
        }
        other => panic!("expected ranked outcome, got {other:?}"),
    }

    state.select_next();
    state.select_next();
    assert_eq!(state.selected, 2);
    for _ in 0..10 {
        state.select_next();
    }
    assert_eq!(state.selected, 3);
    state.select_prev();
    assert_eq!(state.selected, 2);
    assert!(state.selected_entry().is_some());
}

#[test]
fn input_accepts_digits_and_one_decimal_point() {
    let mut state = DashboardState::new(6);
    type_str(&mut state, "8a.2.5x");
    assert_eq!(state.inputs[0], "8.25");
    state.backspace();
    assert_eq!(state.inputs[0], "8.2");
    assert_eq!(state.query().height_wo_shoes, Some(8.2));

    state.focus_prev();
    assert_eq!(state.focused_feature(), Feature::HandWidth);
    state.focus_next();
    assert_eq!(state.focused_feature(), Feature::HeightWoShoes);

    state.clear_inputs();
    assert!(state.inputs.iter().all(String::is_empty));
    assert_eq!(state.outcome, Outcome::Idle);
}

#[test]
fn top_k_is_at_least_one() {
    assert_eq!(DashboardState::new(0).top_k, 1);
}

#[test]
fn configured_filter_limits_dashboard_results() {
    let base = table();
    let drafted = base.records()[1].clone();
    let mut attrs = HashMap::new();
    attrs.insert(
        drafted.player_name.clone(),
        PlayerAttributes {
            draft_pick: Some(8),
            minutes_played: Some(4200.0),
        },
    );
    let enriched = enrich_table(&base, &StaticEnrichment::new(attrs));

    let mut state = DashboardState::new(6).with_filter(RankingFilter {
        max_draft_pick: Some(14),
        min_minutes_played: None,
    });
    state.set_query(&QueryVector::from(base.records()[0].profile));
    state.submit(&enriched);

    match &state.outcome {
        Outcome::Ranked { top, total, .. } => {
            assert_eq!(*total, 1);
            assert_eq!(top.len(), 1);
            assert_eq!(top[0].record.player_name, drafted.player_name);
            assert_eq!(top[0].record.attributes.draft_pick, Some(8));
        }
        other => panic!("expected ranked outcome, got {other:?}"),
    }
}
