// Recent form and head-to-head history relative to a reference date.

use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Match, Outcome, TeamId};
use crate::store::{date_param, QueryInterface};

fn limit_param(limit: usize) -> Value {
    Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

/// The last `limit` matches `team` played strictly before `before`, most
/// recent first.
pub fn recent_form<Q: QueryInterface>(
    store: &Q,
    team: TeamId,
    before: NaiveDate,
    limit: usize,
) -> Result<Vec<Match>> {
    store.select_map(
        "recent_form",
        &format!(
            "SELECT {} FROM {}
             WHERE (m.team1_id = ?1 OR m.team2_id = ?1) AND date(m.date) < ?2
             ORDER BY date(m.date) DESC, m.id DESC
             LIMIT ?3",
            Match::COLUMNS,
            Match::FROM
        ),
        &[team.into(), date_param(before), limit_param(limit)],
        Match::from_row,
    )
}

/// Matches between `a` and `b` (either order) strictly before `before`, most
/// recent first, at most `limit` of them. Swapping `a` and `b` gives the same
/// result.
pub fn head_to_head<Q: QueryInterface>(
    store: &Q,
    a: TeamId,
    b: TeamId,
    before: NaiveDate,
    limit: usize,
) -> Result<Vec<Match>> {
    store.select_map(
        "head_to_head",
        &format!(
            "SELECT {} FROM {}
             WHERE ((m.team1_id = ?1 AND m.team2_id = ?2) OR (m.team1_id = ?2 AND m.team2_id = ?1))
               AND date(m.date) < ?3
             ORDER BY date(m.date) DESC, m.id DESC
             LIMIT ?4",
            Match::COLUMNS,
            Match::FROM
        ),
        &[a.into(), b.into(), date_param(before), limit_param(limit)],
        Match::from_row,
    )
}

/// Compact form guide such as `WDLDW`, most recent first; `-` marks a match
/// with no result.
pub fn form_guide(matches: &[Match], team: TeamId) -> String {
    matches
        .iter()
        .map(|m| m.outcome_for(team).map_or('-', |o| o.letter()))
        .collect()
}

/// Tally of a head-to-head history from `a`'s side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHeadSummary {
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
    pub unplayed: usize,
}

impl HeadToHeadSummary {
    pub fn tally(matches: &[Match], a: TeamId) -> Self {
        matches
            .iter()
            .fold(HeadToHeadSummary::default(), |mut acc, m| {
                match m.outcome_for(a) {
                    Some(Outcome::Win) => acc.a_wins += 1,
                    Some(Outcome::Loss) => acc.b_wins += 1,
                    Some(Outcome::Draw) => acc.draws += 1,
                    None => acc.unplayed += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchId;
    use crate::testutil::{date, seeded_db};

    const ARSENAL: TeamId = TeamId(1);
    const CHELSEA: TeamId = TeamId(2);
    const LIVERPOOL: TeamId = TeamId(3);

    fn ids(matches: &[Match]) -> Vec<i64> {
        matches.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn form_is_last_five_before_date() {
        let before = date(2024, 5, 19);
        let form = recent_form(&seeded_db(), ARSENAL, before, 5).unwrap();
        assert_eq!(ids(&form), vec![205, 105, 203, 103, 101]);
        assert!(form.iter().all(|m| m.date < before && m.involves(ARSENAL)));
        assert_eq!(form_guide(&form, ARSENAL), "WDLDW");
    }

    #[test]
    fn inspected_match_is_not_in_its_own_form() {
        let before = date(2024, 4, 10);
        let form = recent_form(&seeded_db(), ARSENAL, before, 5).unwrap();
        assert!(form.iter().all(|m| m.id != MatchId(105)));
        assert_eq!(form[0].id, MatchId(203));
    }

    #[test]
    fn form_respects_limit_and_spans_tournaments() {
        let form = recent_form(&seeded_db(), CHELSEA, date(2025, 1, 1), 3).unwrap();
        assert_eq!(ids(&form), vec![205, 204, 106]);
        assert_eq!(form_guide(&form, CHELSEA), "LL-");
    }

    #[test]
    fn no_earlier_matches_is_empty() {
        assert!(recent_form(&seeded_db(), ARSENAL, date(2024, 1, 20), 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn head_to_head_is_symmetric() {
        let db = seeded_db();
        let before = date(2024, 5, 19);
        let ab = head_to_head(&db, ARSENAL, CHELSEA, before, 10).unwrap();
        let ba = head_to_head(&db, CHELSEA, ARSENAL, before, 10).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ids(&ab), vec![205, 202, 201]);
        assert!(ab.iter().all(|m| m.is_between(ARSENAL, CHELSEA)));
    }

    #[test]
    fn head_to_head_excludes_reference_day() {
        let h2h = head_to_head(&seeded_db(), ARSENAL, CHELSEA, date(2024, 5, 4), 10).unwrap();
        assert_eq!(ids(&h2h), vec![202, 201]);
    }

    #[test]
    fn head_to_head_limit_and_summary() {
        let db = seeded_db();
        let h2h = head_to_head(&db, ARSENAL, CHELSEA, date(2024, 5, 19), 2).unwrap();
        assert_eq!(ids(&h2h), vec![205, 202]);

        let all = head_to_head(&db, ARSENAL, CHELSEA, date(2024, 5, 19), 10).unwrap();
        assert_eq!(
            HeadToHeadSummary::tally(&all, ARSENAL),
            HeadToHeadSummary {
                a_wins: 2,
                b_wins: 0,
                draws: 1,
                unplayed: 0
            }
        );
    }

    #[test]
    fn unplayed_meeting_counts_as_unplayed() {
        let h2h = head_to_head(&seeded_db(), ARSENAL, LIVERPOOL, date(2024, 12, 31), 10).unwrap();
        assert_eq!(ids(&h2h), vec![206, 203]);
        let summary = HeadToHeadSummary::tally(&h2h, ARSENAL);
        assert_eq!(summary.unplayed, 1);
        assert_eq!(summary.b_wins, 1);
    }
}
