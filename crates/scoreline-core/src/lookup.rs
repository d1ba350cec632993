// Single-record lookups by id, and the one name -> id resolution point.
//
// Aggregations key teams by id only. Display names coming back from the
// presentation layer go through `resolve_team`, which refuses to guess.

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Match, MatchId, Team, TeamId, Tournament, TournamentId};
use crate::store::QueryInterface;

pub fn team_by_id<Q: QueryInterface>(store: &Q, id: TeamId) -> Result<Team> {
    store
        .select_first(
            "team_by_id",
            "SELECT id, name FROM teams WHERE id = ?1",
            &[id.into()],
            |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )?
        .ok_or_else(|| Error::NotFound {
            entity: "team",
            key: id.to_string(),
        })
}

pub fn tournament_by_id<Q: QueryInterface>(store: &Q, id: TournamentId) -> Result<Tournament> {
    store
        .select_first(
            "tournament_by_id",
            "SELECT id, sport_id, name FROM tournaments WHERE id = ?1",
            &[id.into()],
            |row| {
                Ok(Tournament {
                    id: row.get(0)?,
                    sport_id: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )?
        .ok_or_else(|| Error::NotFound {
            entity: "tournament",
            key: id.to_string(),
        })
}

/// A match with its teams' display names resolved.
pub fn match_by_id<Q: QueryInterface>(store: &Q, id: MatchId) -> Result<Match> {
    store
        .select_first(
            "match_by_id",
            &format!(
                "SELECT {} FROM {} WHERE m.id = ?1",
                Match::COLUMNS,
                Match::FROM
            ),
            &[id.into()],
            Match::from_row,
        )?
        .ok_or_else(|| Error::NotFound {
            entity: "match",
            key: id.to_string(),
        })
}

/// Resolve a display name to a team id.
///
/// Matching is exact apart from surrounding whitespace and ASCII case. No
/// match is `NotFound`; several matches are `AmbiguousReference` carrying
/// every candidate id.
pub fn resolve_team<Q: QueryInterface>(store: &Q, name: &str) -> Result<TeamId> {
    let key = name.trim();
    let candidates: Vec<TeamId> = store.select_map(
        "resolve_team",
        "SELECT id FROM teams WHERE name = ?1 COLLATE NOCASE ORDER BY id",
        &[key.to_string().into()],
        |row| row.get(0),
    )?;

    match candidates.as_slice() {
        [] => Err(Error::NotFound {
            entity: "team",
            key: key.to_string(),
        }),
        [id] => {
            debug!("resolved team {key:?} to {id}");
            Ok(*id)
        }
        many => Err(Error::AmbiguousReference {
            entity: "team",
            key: key.to_string(),
            candidates: many.iter().map(|id| id.0).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Score;
    use crate::testutil::{date, seeded_db};

    #[test]
    fn team_lookup_by_id() {
        let db = seeded_db();
        assert_eq!(team_by_id(&db, TeamId(5)).unwrap().name, "Bayern");
        assert!(team_by_id(&db, TeamId(500)).unwrap_err().is_not_found());
    }

    #[test]
    fn tournament_lookup_by_id() {
        let db = seeded_db();
        let t = tournament_by_id(&db, TournamentId(2)).unwrap();
        assert_eq!(t.name, "Champions League");
        assert!(tournament_by_id(&db, TournamentId(9)).unwrap_err().is_not_found());
    }

    #[test]
    fn match_lookup_resolves_names_and_score() {
        let m = match_by_id(&seeded_db(), MatchId(101)).unwrap();
        assert_eq!(m.date, date(2024, 2, 14));
        assert_eq!(m.round, Some(1));
        assert_eq!(m.team1.name, "Arsenal");
        assert_eq!(m.team2.name, "Real Madrid");
        assert_eq!(m.score, Some(Score { team1: 2, team2: 1 }));
        assert_eq!(m.headline(), "2024-02-14: Arsenal 2 - 1 Real Madrid");
    }

    #[test]
    fn missing_match_is_not_found() {
        let err = match_by_id(&seeded_db(), MatchId(999)).unwrap_err();
        assert_eq!(err.to_string(), "match not found: 999");
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let db = seeded_db();
        assert_eq!(resolve_team(&db, "arsenal").unwrap(), TeamId(1));
        assert_eq!(resolve_team(&db, "  Real Madrid ").unwrap(), TeamId(4));
    }

    #[test]
    fn resolve_unknown_name_is_not_found() {
        let err = resolve_team(&seeded_db(), "Nobody FC").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn resolve_duplicate_name_is_ambiguous() {
        match resolve_team(&seeded_db(), "United").unwrap_err() {
            Error::AmbiguousReference { candidates, .. } => assert_eq!(candidates, vec![6, 7]),
            other => panic!("expected AmbiguousReference, got {other:?}"),
        }
    }
}
