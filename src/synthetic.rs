use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::records::{
    Feed, HEIGHT_WO_SHOES_FT_IN, Measurement, PLAYER_NAME, POSITION, RawBatch,
    STANDING_REACH_FT_IN, Season, SeasonBatches, WINGSPAN_FT_IN,
};

const FIRST_NAMES: &[&str] = &[
    "Jalen", "Marcus", "Andre", "Tyrese", "Devin", "Kai", "Omar", "Luka", "Isaiah", "Miles",
    "Jaden", "Darius", "Cole", "Trey", "Malik", "Evan", "Nico", "Reggie",
];
const LAST_NAMES: &[&str] = &[
    "Fox", "Hill", "Moss", "Dunn", "Carter", "Brooks", "Reid", "Vaughn", "Price", "Nash",
    "Ellis", "Grant", "Hayes", "Wade", "Banks", "Stone",
];
const POSITIONS: &[&str] = &["PG", "SG", "SF", "PF", "C", "PG-SG", "SF-PF", "PF-C"];

/// Chance that any single measurement cell comes back unmeasured.
const GAP_RATE: f64 = 0.06;
/// Chance that a player measured in anthro skipped the drills that season.
const NO_DRILL_RATE: f64 = 0.12;

#[derive(Debug, Clone)]
struct Prospect {
    id: u32,
    name: String,
    position: &'static str,
    height: f64,
    weight: f64,
    wingspan_plus: f64,
    reach_ratio: f64,
    hand_length: f64,
    hand_width: f64,
    vert: f64,
}

/// Deterministic combine batches for offline runs, benches and tests.
/// Prospects may return in later seasons, cells are occasionally missing or
/// carry placeholder strings, and some players skip the drill session.
pub fn generate_seasons(seed: u64, seasons: &[Season], players_per_season: usize) -> Vec<SeasonBatches> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool_size = (players_per_season * seasons.len() * 4 / 5).max(players_per_season);
    let pool: Vec<Prospect> = (0..pool_size).map(|idx| prospect(&mut rng, idx as u32)).collect();

    seasons
        .iter()
        .map(|season| {
            let mut anthro_rows = Vec::with_capacity(players_per_season);
            let mut drill_rows = Vec::with_capacity(players_per_season);
            for _ in 0..players_per_season {
                let p = &pool[rng.gen_range(0..pool.len())];
                anthro_rows.push(anthro_row(&mut rng, p));
                if !rng.gen_bool(NO_DRILL_RATE) {
                    drill_rows.push(drill_row(&mut rng, p));
                }
            }
            SeasonBatches {
                season: season.clone(),
                anthro: RawBatch {
                    season: season.clone(),
                    feed: Feed::Anthro,
                    headers: anthro_headers(),
                    rows: anthro_rows,
                },
                drill: RawBatch {
                    season: season.clone(),
                    feed: Feed::Drill,
                    headers: drill_headers(),
                    rows: drill_rows,
                },
            }
        })
        .collect()
}

fn prospect(rng: &mut StdRng, idx: u32) -> Prospect {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    let height = quarter(rng.gen_range(71.0..86.0));
    Prospect {
        id: 1_000 + idx,
        // Suffix keeps names unique across the pool.
        name: format!("{first} {last} {}", idx + 1),
        position: POSITIONS[rng.gen_range(0..POSITIONS.len())],
        height,
        weight: (height * 2.7 + rng.gen_range(-15.0..25.0)).round(),
        wingspan_plus: rng.gen_range(-1.0..8.0),
        reach_ratio: rng.gen_range(1.30..1.36),
        hand_length: quarter(rng.gen_range(7.75..9.75)),
        hand_width: quarter(rng.gen_range(8.0..10.75)),
        vert: rng.gen_range(24.0..34.0),
    }
}

fn anthro_headers() -> Vec<String> {
    let mut headers = vec![
        "PLAYER_ID".to_string(),
        PLAYER_NAME.to_string(),
        POSITION.to_string(),
        HEIGHT_WO_SHOES_FT_IN.to_string(),
        WINGSPAN_FT_IN.to_string(),
        STANDING_REACH_FT_IN.to_string(),
    ];
    headers.extend(Measurement::ANTHRO.iter().map(|m| m.column().to_string()));
    headers
}

fn drill_headers() -> Vec<String> {
    let mut headers = vec![
        "PLAYER_ID".to_string(),
        PLAYER_NAME.to_string(),
        POSITION.to_string(),
    ];
    headers.extend(Measurement::DRILL.iter().map(|m| m.column().to_string()));
    headers
}

fn anthro_row(rng: &mut StdRng, p: &Prospect) -> Vec<Value> {
    let wingspan = quarter(p.height + p.wingspan_plus);
    let reach = quarter(p.height * p.reach_ratio);
    let weight = p.weight + rng.gen_range(-4.0..4.0_f64).round();
    vec![
        json!(p.id),
        json!(p.name),
        json!(p.position),
        json!(feet_inches(p.height)),
        json!(feet_inches(wingspan)),
        json!(feet_inches(reach)),
        maybe_gap(rng, p.height),
        maybe_gap(rng, weight),
        maybe_gap(rng, wingspan),
        maybe_gap(rng, reach),
        maybe_gap(rng, p.hand_length),
        maybe_gap(rng, p.hand_width),
    ]
}

fn drill_row(rng: &mut StdRng, p: &Prospect) -> Vec<Value> {
    let standing = (p.vert + rng.gen_range(-1.5..1.5_f64)).round();
    let max = standing + rng.gen_range(4.0..9.0_f64).round();
    let lane = hundredth(rng.gen_range(10.4..12.8));
    let shuttle = hundredth(rng.gen_range(2.6..3.6));
    let sprint = hundredth(rng.gen_range(3.1..3.6));
    let bench = if rng.gen_bool(0.4) {
        Value::Null
    } else {
        json!(rng.gen_range(0..22))
    };
    vec![
        json!(p.id),
        json!(p.name),
        json!(p.position),
        maybe_gap(rng, standing),
        maybe_gap(rng, max),
        maybe_gap(rng, lane),
        maybe_gap(rng, shuttle),
        maybe_gap(rng, sprint),
        bench,
    ]
}

fn maybe_gap(rng: &mut StdRng, value: f64) -> Value {
    if !rng.gen_bool(GAP_RATE) {
        return json!(value);
    }
    match rng.gen_range(0..3) {
        0 => Value::Null,
        1 => json!("-"),
        _ => json!(""),
    }
}

fn feet_inches(inches: f64) -> String {
    let feet = (inches / 12.0).floor();
    format!("{}' {}''", feet, inches - feet * 12.0)
}

fn quarter(value: f64) -> f64 {
    (value * 4.0).round() / 4.0
}

fn hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
