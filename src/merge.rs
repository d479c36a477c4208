use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::normalize::NormalizedFeeds;
use crate::records::{
    AnthroRow, CanonicalPlayerRecord, CanonicalTable, DrillRow, Measurement, PlayerAttributes,
    PlayerSeasonRecord, Season,
};

/// Join both feeds, drop rows lacking a comparison feature, then collapse each
/// player's seasons into a single canonical record.
pub fn clean_and_merge(feeds: &NormalizedFeeds) -> CanonicalTable {
    let joined = join_feeds(&feeds.anthro, &feeds.drill);
    let joined_len = joined.len();
    let complete = retain_complete(joined);
    let complete_len = complete.len();
    let table = CanonicalTable::new(deduplicate(complete));
    info!(
        anthro_rows = feeds.anthro.len(),
        drill_rows = feeds.drill.len(),
        joined = joined_len,
        complete = complete_len,
        players = table.len(),
        "built canonical combine table"
    );
    table
}

/// Inner join on (player name, season). Anthro order is preserved; a key
/// present more than once in both feeds yields every pairing.
pub fn join_feeds(anthro: &[AnthroRow], drill: &[DrillRow]) -> Vec<PlayerSeasonRecord> {
    let mut drill_index: HashMap<(&str, &Season), Vec<&DrillRow>> = HashMap::new();
    for row in drill {
        drill_index
            .entry((row.player_name.as_str(), &row.season))
            .or_default()
            .push(row);
    }

    let mut out = Vec::with_capacity(anthro.len());
    for a in anthro {
        let Some(matches) = drill_index.get(&(a.player_name.as_str(), &a.season)) else {
            debug!(player = %a.player_name, season = %a.season, "no drill row for season");
            continue;
        };
        for d in matches {
            out.push(PlayerSeasonRecord {
                player_name: a.player_name.clone(),
                season: a.season.clone(),
                position: a.position.clone(),
                height_wo_shoes_ft_in: a.height_wo_shoes_ft_in.clone(),
                wingspan_ft_in: a.wingspan_ft_in.clone(),
                standing_reach_ft_in: a.standing_reach_ft_in.clone(),
                anthro: a.values.clone(),
                drill: d.values.clone(),
            });
        }
    }
    out
}

/// Keep rows that carry all five comparison features.
pub fn retain_complete(records: Vec<PlayerSeasonRecord>) -> Vec<PlayerSeasonRecord> {
    records
        .into_iter()
        .filter(|r| {
            let keep = r.profile().is_some();
            if !keep {
                debug!(player = %r.player_name, season = %r.season, "dropping row missing a required measurement");
            }
            keep
        })
        .collect()
}

/// One record per player name, ordered by name. Each field comes from the
/// newest season that has it, falling back to older seasons.
pub fn deduplicate(records: Vec<PlayerSeasonRecord>) -> Vec<CanonicalPlayerRecord> {
    let mut groups: BTreeMap<String, Vec<PlayerSeasonRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.player_name.clone())
            .or_default()
            .push(record);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (name, mut group) in groups {
        // Stable: equal years keep input order; unparseable seasons sort oldest.
        group.sort_by(|a, b| b.season.start_year().cmp(&a.season.start_year()));
        let Some(collapsed) = collapse_group(&group) else {
            debug!(player = %name, "no complete canonical record after collapse");
            continue;
        };
        out.push(collapsed);
    }
    out
}

/// `group` must be ordered newest season first.
fn collapse_group(group: &[PlayerSeasonRecord]) -> Option<CanonicalPlayerRecord> {
    let newest = group.first()?;
    let mut merged = newest.clone();
    for m in Measurement::ALL {
        merged.set_measurement(m, backfilled(group, |r| r.measurement(m)));
    }
    merged.position = backfilled(group, |r| r.position.clone());
    merged.height_wo_shoes_ft_in = backfilled(group, |r| r.height_wo_shoes_ft_in.clone());
    merged.wingspan_ft_in = backfilled(group, |r| r.wingspan_ft_in.clone());
    merged.standing_reach_ft_in = backfilled(group, |r| r.standing_reach_ft_in.clone());

    let profile = merged.profile()?;
    let mut seasons: Vec<Season> = Vec::with_capacity(group.len());
    for r in group {
        if !seasons.contains(&r.season) {
            seasons.push(r.season.clone());
        }
    }

    Some(CanonicalPlayerRecord {
        player_name: merged.player_name,
        season: newest.season.clone(),
        seasons,
        position: merged.position,
        height_wo_shoes_ft_in: merged.height_wo_shoes_ft_in,
        wingspan_ft_in: merged.wingspan_ft_in,
        standing_reach_ft_in: merged.standing_reach_ft_in,
        profile,
        weight: merged.anthro.weight,
        drill: merged.drill,
        attributes: PlayerAttributes::default(),
    })
}

/// First present value scanning newest to oldest, then oldest to newest.
fn backfilled<T>(
    group: &[PlayerSeasonRecord],
    pick: impl Fn(&PlayerSeasonRecord) -> Option<T>,
) -> Option<T> {
    group
        .iter()
        .find_map(&pick)
        .or_else(|| group.iter().rev().find_map(&pick))
}

#[cfg(test)]
mod tests {
    use super::deduplicate;
    use crate::records::{Anthropometrics, DrillResults, PlayerSeasonRecord, Season};

    fn record(season: &str, height: f64, weight: Option<f64>, bench: Option<f64>) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            player_name: "Sam Rivers".to_string(),
            season: Season::new(season),
            position: None,
            height_wo_shoes_ft_in: None,
            wingspan_ft_in: None,
            standing_reach_ft_in: None,
            anthro: Anthropometrics {
                height_wo_shoes: Some(height),
                weight,
                wingspan: Some(84.0),
                standing_reach: Some(107.0),
                hand_length: Some(8.5),
                hand_width: Some(9.0),
            },
            drill: DrillResults {
                bench_press: bench,
                ..DrillResults::default()
            },
        }
    }

    #[test]
    fn newest_season_wins_and_older_seasons_backfill() {
        let rows = vec![
            record("2018-19", 78.0, Some(205.0), Some(10.0)),
            record("2020-21", 79.5, None, None),
            record("2019-20", 79.0, Some(210.0), None),
        ];
        let out = deduplicate(rows);
        assert_eq!(out.len(), 1);
        let p = &out[0];
        assert_eq!(p.season.label(), "2020-21");
        assert_eq!(p.profile.height_wo_shoes, 79.5);
        assert_eq!(p.weight, Some(210.0));
        assert_eq!(p.drill.bench_press, Some(10.0));
        let seasons: Vec<&str> = p.seasons.iter().map(|s| s.label()).collect();
        assert_eq!(seasons, vec!["2020-21", "2019-20", "2018-19"]);
    }

    #[test]
    fn unparseable_season_sorts_as_oldest() {
        let rows = vec![record("unknown", 70.0, None, None), record("2001-02", 75.0, None, None)];
        let out = deduplicate(rows);
        assert_eq!(out[0].season.label(), "2001-02");
        assert_eq!(out[0].profile.height_wo_shoes, 75.0);
    }
}
