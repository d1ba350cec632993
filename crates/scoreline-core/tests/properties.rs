// Properties every aggregation must hold over the fixture store.

mod common;

use scoreline_core::form::{head_to_head, recent_form};
use scoreline_core::lineups::load_lineups;
use scoreline_core::model::{Match, MatchId, TeamId, TournamentId};
use scoreline_core::standings::{compute_standings, Band, BandRules};
use scoreline_core::stats::{pivot_match_stats, StatValue};
use scoreline_core::timeline::list_events;
use scoreline_core::QueryInterface;

use chrono::NaiveDate;

fn all_matches(db: &scoreline_core::Database) -> Vec<(MatchId, NaiveDate, TeamId, TeamId)> {
    db.select_map(
        "all_matches",
        "SELECT id, date(date), team1_id, team2_id FROM matches ORDER BY id",
        &[],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )
    .unwrap()
}

fn team_ids(db: &scoreline_core::Database) -> Vec<TeamId> {
    db.select_map("team_ids", "SELECT id FROM teams ORDER BY id", &[], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn standings_positions_are_dense_and_cover_every_team() {
    let db = common::seeded_with(
        // A fourth tournament whose stored positions have a gap.
        "INSERT INTO tournaments (id, sport_id, name) VALUES (4, 1, 'FA Cup');
         INSERT INTO standings (tournament_id, team_id, position, points) VALUES
            (4, 1, 1, 9), (4, 2, 4, 3), (4, 3, 2, 6);",
    );
    for tournament in 1..=4 {
        let id = TournamentId(tournament);
        let rows = compute_standings(&db, id).unwrap();
        let positions: Vec<u32> = rows.iter().map(|r| r.position).collect();
        let expected: Vec<u32> = (1..=rows.len() as u32).collect();
        assert_eq!(positions, expected, "tournament {tournament}");

        let distinct: i64 = db
            .select_first(
                "distinct_teams",
                "SELECT COUNT(DISTINCT team_id) FROM standings WHERE tournament_id = ?1",
                &[id.into()],
                |row| row.get(0),
            )
            .unwrap()
            .unwrap();
        assert_eq!(rows.len() as i64, distinct, "tournament {tournament}");
    }
}

#[test]
fn bands_are_derived_from_position() {
    let rows = compute_standings(&common::seeded(), TournamentId(2)).unwrap();
    let rules = BandRules {
        qualification_spots: 2,
        relegation_spots: 1,
    };
    let bands: Vec<Band> = rules.classify(&rows).map(|(_, band)| band).collect();
    assert_eq!(
        bands,
        vec![
            Band::Qualification,
            Band::Qualification,
            Band::MidTable,
            Band::Relegation
        ]
    );
}

#[test]
fn timelines_are_sorted_and_stable() {
    let db = common::seeded();
    for (id, ..) in all_matches(&db) {
        let first = list_events(&db, id).unwrap();
        assert!(first.windows(2).all(|w| w[0].minute <= w[1].minute));
        assert_eq!(first, list_events(&db, id).unwrap());
    }
}

#[test]
fn recent_form_is_bounded_and_strictly_earlier() {
    let db = common::seeded();
    let matches = all_matches(&db);
    for team in team_ids(&db) {
        for &(_, date, ..) in &matches {
            let form = recent_form(&db, team, date, 5).unwrap();
            assert!(form.len() <= 5);
            assert!(form.iter().all(|m| m.date < date && m.involves(team)));

            let latest = matches
                .iter()
                .filter(|(_, d, t1, t2)| *d < date && (*t1 == team || *t2 == team))
                .map(|(_, d, ..)| *d)
                .max();
            assert_eq!(form.first().map(|m| m.date), latest);
        }
    }
}

#[test]
fn head_to_head_ignores_argument_order() {
    let db = common::seeded();
    let teams = team_ids(&db);
    let dates: Vec<NaiveDate> = all_matches(&db).into_iter().map(|(_, d, ..)| d).collect();
    for &a in &teams {
        for &b in &teams {
            for &date in &dates {
                let ab: Vec<Match> = head_to_head(&db, a, b, date, 10).unwrap();
                assert_eq!(ab, head_to_head(&db, b, a, date, 10).unwrap());
                assert!(ab.iter().all(|m| m.is_between(a, b) && m.date < date));
            }
        }
    }
}

#[test]
fn shots_pivot_to_a_single_line() {
    let db = common::seeded_with(
        "INSERT INTO match_stats (match_id, team_id, stat_name, stat_value) VALUES
            (101, 1, 'Shots', '18'),
            (101, 4, 'Shots', '10');",
    );
    let pivot = pivot_match_stats(&db, MatchId(101), TeamId(1), TeamId(4)).unwrap();
    assert_eq!(pivot.lines.len(), 1);
    let shots = &pivot.lines[0];
    assert_eq!(shots.name, "Shots");
    assert_eq!(shots.team1, StatValue::Value("18".into()));
    assert_eq!(shots.team2, StatValue::Value("10".into()));
}

#[test]
fn uneven_lineups_expose_group_sizes() {
    let lineups = load_lineups(&common::seeded(), MatchId(105), TeamId(1), TeamId(5)).unwrap();
    let sizes = lineups.sizes();
    assert_eq!(sizes.team1_starters, 3);
    assert_eq!(sizes.team2_starters, 2);

    let rows: Vec<_> = lineups.aligned_starters().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[2].1.is_none());
}
