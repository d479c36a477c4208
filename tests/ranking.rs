use std::collections::HashMap;

use combine_comps::comparison::compare;
use combine_comps::config::season_range;
use combine_comps::enrichment::{RankingFilter, StaticEnrichment, enrich_table};
use combine_comps::error::RankError;
use combine_comps::pipeline::build_canonical_table;
use combine_comps::records::{
    CanonicalPlayerRecord, CanonicalTable, DrillResults, Feature, Measurement, PhysicalProfile,
    PlayerAttributes, QueryVector, Season,
};
use combine_comps::similarity::calculate_player_distances;
use combine_comps::synthetic::generate_seasons;

fn player(name: &str, dims: [f64; 5]) -> CanonicalPlayerRecord {
    CanonicalPlayerRecord {
        player_name: name.to_string(),
        season: Season::new("2020-21"),
        seasons: vec![Season::new("2020-21")],
        position: None,
        height_wo_shoes_ft_in: None,
        wingspan_ft_in: None,
        standing_reach_ft_in: None,
        profile: PhysicalProfile {
            height_wo_shoes: dims[0],
            wingspan: dims[1],
            standing_reach: dims[2],
            hand_length: dims[3],
            hand_width: dims[4],
        },
        weight: None,
        drill: DrillResults::default(),
        attributes: PlayerAttributes::default(),
    }
}

fn query(dims: [f64; 5]) -> QueryVector {
    QueryVector {
        height_wo_shoes: Some(dims[0]),
        wingspan: Some(dims[1]),
        standing_reach: Some(dims[2]),
        hand_length: Some(dims[3]),
        hand_width: Some(dims[4]),
    }
}

fn names(ranked: &[combine_comps::records::RankedResult]) -> Vec<&str> {
    ranked.iter().map(|r| r.player_name.as_str()).collect()
}

fn synthetic_table() -> CanonicalTable {
    let seasons = generate_seasons(7, &season_range(2010, 2014), 40);
    build_canonical_table(&seasons)
}

#[test]
fn exact_match_ranks_first() {
    let table = CanonicalTable::new(vec![
        player("A", [80.0, 85.0, 108.0, 8.25, 8.75]),
        player("B", [78.0, 82.0, 104.0, 8.0, 8.5]),
    ]);
    let ranked =
        calculate_player_distances(&table, &query([80.0, 85.0, 108.0, 8.25, 8.75])).expect("ranks");
    assert_eq!(names(&ranked), vec!["A", "B"]);
    assert!(ranked[0].distance.abs() < 1e-9);
    assert!(ranked[1].distance > 0.0);
}

#[test]
fn missing_wingspan_is_invalid_query() {
    let table = CanonicalTable::new(vec![player("A", [80.0, 85.0, 108.0, 8.25, 8.75])]);
    let mut q = query([80.0, 85.0, 108.0, 8.25, 8.75]);
    q.wingspan = None;
    match calculate_player_distances(&table, &q) {
        Err(RankError::InvalidQuery { missing }) => assert_eq!(missing, vec![Feature::Wingspan]),
        other => panic!("expected invalid query, got {other:?}"),
    }
}

#[test]
fn non_finite_query_values_count_as_missing() {
    let table = CanonicalTable::new(vec![player("A", [80.0, 85.0, 108.0, 8.25, 8.75])]);
    let mut q = query([80.0, 85.0, 108.0, 8.25, 8.75]);
    q.hand_width = Some(f64::NAN);
    q.height_wo_shoes = Some(f64::INFINITY);
    let err = calculate_player_distances(&table, &q).expect_err("rejected");
    assert!(err.is_invalid_query());
    assert_eq!(
        err,
        RankError::InvalidQuery {
            missing: vec![Feature::HeightWoShoes, Feature::HandWidth]
        }
    );
}

#[test]
fn empty_table_is_reported_after_query_validation() {
    let table = CanonicalTable::default();
    assert_eq!(
        calculate_player_distances(&table, &query([80.0, 85.0, 108.0, 8.25, 8.75])),
        Err(RankError::EmptyTable)
    );
    // An incomplete query is reported first even against an empty table.
    assert!(
        calculate_player_distances(&table, &QueryVector::default())
            .expect_err("invalid")
            .is_invalid_query()
    );
}

#[test]
fn ranking_is_complete_and_deterministic() {
    let table = synthetic_table();
    assert!(table.len() > 30);
    let q = query([78.0, 83.0, 105.0, 8.5, 9.25]);
    let first = calculate_player_distances(&table, &q).expect("ranks");
    let second = calculate_player_distances(&table, &q).expect("ranks");
    assert_eq!(first, second);
    assert_eq!(first.len(), table.len());
    assert!(first.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert!(first.iter().all(|r| r.distance.is_finite() && r.distance >= 0.0));
}

#[test]
fn query_equal_to_a_row_puts_that_row_first() {
    let table = synthetic_table();
    let target = &table.records()[table.len() / 2];
    let ranked = calculate_player_distances(&table, &QueryVector::from(target.profile))
        .expect("ranks");
    assert!(ranked[0].distance.abs() < 1e-9);
    // Another row could share the exact profile; the target must still tie at zero.
    let target_rank = ranked
        .iter()
        .find(|r| r.player_name == target.player_name)
        .expect("target ranked");
    assert!(target_rank.distance.abs() < 1e-9);
}

#[test]
fn ties_keep_table_order() {
    let table = CanonicalTable::new(vec![
        player("Cal", [76.0, 80.0, 102.0, 8.0, 9.0]),
        player("Ace", [80.0, 84.0, 106.0, 8.5, 9.5]),
        player("Bo", [80.0, 84.0, 106.0, 8.5, 9.5]),
    ]);
    let ranked =
        calculate_player_distances(&table, &query([80.0, 84.0, 106.0, 8.5, 9.5])).expect("ranks");
    assert_eq!(names(&ranked), vec!["Ace", "Bo", "Cal"]);
    assert_eq!(ranked[0].distance, ranked[1].distance);
}

#[test]
fn rescaling_one_feature_keeps_order() {
    let table = synthetic_table();
    let q = [79.0, 84.5, 106.0, 8.75, 9.5];
    let baseline = calculate_player_distances(&table, &query(q)).expect("ranks");

    for feature_idx in 0..5 {
        let factor = 2.54;
        let scaled: Vec<CanonicalPlayerRecord> = table
            .iter()
            .map(|r| {
                let mut dims = r.profile.to_array();
                dims[feature_idx] *= factor;
                let mut out = r.clone();
                out.profile = player("", dims).profile;
                out
            })
            .collect();
        let mut scaled_q = q;
        scaled_q[feature_idx] *= factor;
        let rescaled = calculate_player_distances(&CanonicalTable::new(scaled), &query(scaled_q))
            .expect("ranks");
        for (a, b) in baseline.iter().zip(&rescaled) {
            assert!((a.distance - b.distance).abs() < 1e-6);
        }
        let before: HashMap<&str, f64> = baseline
            .iter()
            .map(|r| (r.player_name.as_str(), r.distance))
            .collect();
        for pair in rescaled.windows(2) {
            let d0 = before[pair[0].player_name.as_str()];
            let d1 = before[pair[1].player_name.as_str()];
            assert!(d0 <= d1 + 1e-6);
        }
    }
}

#[test]
fn zero_variance_feature_is_ignored() {
    let table = CanonicalTable::new(vec![
        player("Far", [70.0, 85.0, 108.0, 8.5, 9.0]),
        player("Near", [80.0, 85.0, 108.0, 8.5, 9.0]),
    ]);
    // Every row shares wingspan, reach, hand sizes; a wildly different query
    // value on those dims must not change the order or produce NaN.
    let ranked =
        calculate_player_distances(&table, &query([80.0, 99.0, 120.0, 11.0, 12.0])).expect("ranks");
    assert_eq!(names(&ranked), vec!["Near", "Far"]);
    assert!(ranked[0].distance.abs() < 1e-9);
    assert!((ranked[1].distance - 2.0).abs() < 1e-9);
}

#[test]
fn single_player_table_ranks_at_zero() {
    let table = CanonicalTable::new(vec![player("Only", [78.0, 82.0, 104.0, 8.0, 8.5])]);
    let ranked =
        calculate_player_distances(&table, &query([90.0, 95.0, 120.0, 10.0, 11.0])).expect("ranks");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].distance, 0.0);
}

#[test]
fn compare_takes_top_k_and_averages() {
    let mut near = player("Near", [80.0, 85.0, 108.0, 8.25, 8.75]);
    near.weight = Some(210.0);
    near.drill.bench_press = Some(10.0);
    let mut mid = player("Mid", [79.0, 84.0, 107.0, 8.25, 8.75]);
    mid.weight = Some(215.0);
    let far = player("Far", [72.0, 75.0, 96.0, 7.5, 8.0]);
    let table = CanonicalTable::new(vec![far, mid, near]);

    let comparison = compare(
        &table,
        &query([80.0, 85.0, 108.0, 8.25, 8.75]),
        2,
        &RankingFilter::default(),
    )
    .expect("ranks");
    assert_eq!(comparison.ranked.len(), 3);
    let top: Vec<&str> = comparison
        .top
        .iter()
        .map(|(r, _)| r.player_name.as_str())
        .collect();
    assert_eq!(top, vec!["Near", "Mid"]);

    let avg = |m: Measurement| {
        comparison
            .averages
            .iter()
            .find(|a| a.measurement == m)
            .and_then(|a| a.mean)
    };
    assert_eq!(avg(Measurement::HeightWoShoes), Some(79.5));
    assert_eq!(avg(Measurement::Weight), Some(212.5));
    assert_eq!(avg(Measurement::BenchPress), Some(10.0));
    assert_eq!(avg(Measurement::LaneAgilityTime), None);
}

#[test]
fn enrichment_filter_drops_players_after_ranking() {
    let table = CanonicalTable::new(vec![
        player("Lottery", [79.0, 84.0, 107.0, 8.25, 8.75]),
        player("Undrafted", [80.0, 85.0, 108.0, 8.25, 8.75]),
        player("Second", [76.0, 80.0, 101.0, 8.0, 8.5]),
    ]);
    let mut attrs = HashMap::new();
    attrs.insert(
        "Lottery".to_string(),
        PlayerAttributes {
            draft_pick: Some(5),
            minutes_played: Some(9000.0),
        },
    );
    attrs.insert(
        "Second".to_string(),
        PlayerAttributes {
            draft_pick: Some(44),
            minutes_played: Some(300.0),
        },
    );
    let table = enrich_table(&table, &StaticEnrichment::new(attrs));
    let q = query([80.0, 85.0, 108.0, 8.25, 8.75]);

    let unfiltered = compare(&table, &q, 6, &RankingFilter::default()).expect("ranks");
    assert_eq!(
        names(&unfiltered.ranked),
        vec!["Undrafted", "Lottery", "Second"]
    );

    let filter = RankingFilter {
        max_draft_pick: Some(30),
        min_minutes_played: None,
    };
    let filtered = compare(&table, &q, 6, &filter).expect("ranks");
    assert_eq!(names(&filtered.ranked), vec!["Lottery"]);
    // Scale is fitted on the full table, so distances are unchanged.
    assert_eq!(filtered.ranked[0].distance, unfiltered.ranked[1].distance);
}
