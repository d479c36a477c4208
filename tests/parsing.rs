use std::fs;
use std::path::PathBuf;

use combine_comps::combine_fetch::{combine_url, parse_result_set_json};
use combine_comps::normalize::{normalize_anthro_batches, normalize_drill_batches};
use combine_comps::pipeline::build_canonical_table;
use combine_comps::records::{Feed, Season, SeasonBatches};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn season() -> Season {
    Season::new("2019-20")
}

#[test]
fn parses_anthro_result_set() {
    let batch = parse_result_set_json(&read_fixture("anthro_2019.json"), season(), Feed::Anthro)
        .expect("fixture should parse");
    assert_eq!(batch.rows.len(), 3);
    assert_eq!(batch.column_index("PLAYER_NAME"), Some(4));
    assert_eq!(batch.feed, Feed::Anthro);

    let rows = normalize_anthro_batches(&[batch]);
    assert_eq!(rows.len(), 3);
    let fox = &rows[0];
    assert_eq!(fox.player_name, "Jalen Fox");
    assert_eq!(fox.position.as_deref(), Some("SG"));
    assert_eq!(fox.values.height_wo_shoes, Some(77.25));
    // Numeric strings coerce.
    assert_eq!(fox.values.weight, Some(201.4));
    assert_eq!(fox.height_wo_shoes_ft_in.as_deref(), Some("6' 5.25''"));

    let reid = &rows[2];
    assert_eq!(reid.values.weight, None);
    assert_eq!(reid.values.wingspan, None);
    assert_eq!(reid.values.standing_reach, Some(107.0));
}

#[test]
fn parses_drill_result_set_with_placeholders() {
    let batch = parse_result_set_json(&read_fixture("drill_2019.json"), season(), Feed::Drill)
        .expect("fixture should parse");
    let rows = normalize_drill_batches(&[batch]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].values.bench_press, Some(9.0));
    assert_eq!(rows[1].values.max_vertical_leap, Some(31.5));
    assert_eq!(rows[1].values.modified_lane_agility_time, None);
    assert_eq!(rows[2].values.lane_agility_time, None);
    assert_eq!(rows[2].values.bench_press, None);
}

#[test]
fn fixture_season_builds_canonical_table() {
    let anthro = parse_result_set_json(&read_fixture("anthro_2019.json"), season(), Feed::Anthro)
        .expect("anthro fixture");
    let drill = parse_result_set_json(&read_fixture("drill_2019.json"), season(), Feed::Drill)
        .expect("drill fixture");
    let table = build_canonical_table(&[SeasonBatches {
        season: season(),
        anthro,
        drill,
    }]);

    // Miles Reid has no wingspan and is dropped.
    assert_eq!(table.len(), 2);
    assert!(table.get("Miles Reid").is_none());
    let hill = table.get("Omar Hill").expect("Omar Hill survives");
    assert_eq!(hill.profile.hand_width, 10.25);
    assert_eq!(hill.drill.three_quarter_sprint, Some(3.42));
}

#[test]
fn empty_and_null_bodies_are_empty_batches() {
    for raw in ["", "null", "  ", r#"{"resource":"draftcombineplayeranthro"}"#] {
        let batch = parse_result_set_json(raw, season(), Feed::Anthro).expect("should parse");
        assert!(batch.is_empty());
    }
}

#[test]
fn singular_result_set_and_short_rows() {
    let raw = r#"{"resultSet":{"headers":["PLAYER_NAME","WINGSPAN","HAND_WIDTH"],"rowSet":[["Kai Moss",84.0]]}}"#;
    let batch = parse_result_set_json(raw, season(), Feed::Anthro).expect("should parse");
    assert_eq!(batch.rows.len(), 1);
    assert_eq!(batch.rows[0].len(), 3);
    assert!(batch.rows[0][2].is_null());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(parse_result_set_json("{not json", season(), Feed::Drill).is_err());
}

#[test]
fn urls_carry_season_label() {
    assert_eq!(
        combine_url(Feed::Drill, &Season::from_start_year(2004)),
        "https://stats.nba.com/stats/draftcombinedrillresults?LeagueID=00&SeasonYear=2004-05"
    );
}
