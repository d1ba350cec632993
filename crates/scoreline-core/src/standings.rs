// Ranked standings table per tournament, plus presentation bands.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::model::{Team, TeamId, TournamentId};
use crate::store::QueryInterface;

/// One ranked row of a tournament table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub tournament_id: TournamentId,
    pub team: Team,
    /// Dense 1-based rank, unique within the tournament.
    pub position: u32,
    pub points: i64,
    pub played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
}

impl StandingRow {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for - self.goals_against
    }
}

/// Compute the ranked table for a tournament.
///
/// Rows come back ordered by the stored `position`. Rows without a position
/// sort after positioned ones by points, then goal difference, then store
/// order. A team listed twice keeps its first row. When the stored positions
/// are missing or not a dense `1..=N` sequence, every row is renumbered in
/// the resulting order so the output ranking is always dense.
pub fn compute_standings<Q: QueryInterface>(
    store: &Q,
    tournament: TournamentId,
) -> Result<Vec<StandingRow>> {
    let raw: Vec<(Option<u32>, StandingRow)> = store.select_map(
        "compute_standings",
        "SELECT s.position, s.team_id, COALESCE(t.name, ''), s.points, s.played,
                s.wins, s.draws, s.losses, s.goals_for, s.goals_against
         FROM standings s
         LEFT JOIN teams t ON t.id = s.team_id
         WHERE s.tournament_id = ?1
         ORDER BY s.position IS NULL, s.position, s.points DESC,
                  (s.goals_for - s.goals_against) DESC, s.rowid",
        &[tournament.into()],
        |row| {
            let position: Option<u32> = row.get(0)?;
            Ok((
                position,
                StandingRow {
                    tournament_id: tournament,
                    team: Team {
                        id: row.get(1)?,
                        name: row.get(2)?,
                    },
                    position: position.unwrap_or(0),
                    points: row.get(3)?,
                    played: row.get(4)?,
                    wins: row.get(5)?,
                    draws: row.get(6)?,
                    losses: row.get(7)?,
                    goals_for: row.get(8)?,
                    goals_against: row.get(9)?,
                },
            ))
        },
    )?;

    let mut seen: HashSet<TeamId> = HashSet::new();
    let mut rows: Vec<(Option<u32>, StandingRow)> = Vec::with_capacity(raw.len());
    for (position, row) in raw {
        if seen.insert(row.team.id) {
            rows.push((position, row));
        } else {
            warn!(
                "tournament {tournament}: duplicate standings row for team {}, keeping the first",
                row.team.id
            );
        }
    }

    let dense = rows
        .iter()
        .enumerate()
        .all(|(idx, (position, _))| *position == u32::try_from(idx + 1).ok());
    if !dense {
        warn!("tournament {tournament}: stored positions are missing or not dense, re-ranking");
    }

    Ok(rows
        .into_iter()
        .zip(1u32..)
        .map(|((_, mut row), rank)| {
            if !dense {
                row.position = rank;
            }
            row
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Presentation bands
// ---------------------------------------------------------------------------

/// Table zone a position falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Qualification,
    MidTable,
    Relegation,
}

/// How many places at the top and bottom of a table are highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BandRules {
    pub qualification_spots: usize,
    pub relegation_spots: usize,
}

impl Default for BandRules {
    fn default() -> Self {
        Self {
            qualification_spots: 4,
            relegation_spots: 3,
        }
    }
}

impl BandRules {
    /// Band for `position` in a table of `table_size` rows. Qualification wins
    /// when the two zones overlap in a short table.
    pub fn band(&self, position: u32, table_size: usize) -> Band {
        let position = position as usize;
        if position <= self.qualification_spots {
            Band::Qualification
        } else if self.relegation_spots > 0
            && position > table_size.saturating_sub(self.relegation_spots)
        {
            Band::Relegation
        } else {
            Band::MidTable
        }
    }

    /// Pair every row with its band.
    pub fn classify<'a>(
        &'a self,
        rows: &'a [StandingRow],
    ) -> impl Iterator<Item = (&'a StandingRow, Band)> + 'a {
        rows.iter()
            .map(move |row| (row, self.band(row.position, rows.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seeded_db, seeded_db_with};

    fn positions(rows: &[StandingRow]) -> Vec<u32> {
        rows.iter().map(|r| r.position).collect()
    }

    fn team_names(rows: &[StandingRow]) -> Vec<&str> {
        rows.iter().map(|r| r.team.name.as_str()).collect()
    }

    #[test]
    fn stored_positions_order_the_table() {
        let rows = compute_standings(&seeded_db(), TournamentId(1)).unwrap();
        assert_eq!(positions(&rows), vec![1, 2, 3]);
        assert_eq!(team_names(&rows), vec!["Arsenal", "Liverpool", "Chelsea"]);
        assert_eq!(rows[0].goal_difference(), 2);
        assert_eq!(rows[2].goal_difference(), -5);
    }

    #[test]
    fn stored_position_is_trusted_over_points() {
        // Real Madrid sits 2nd on fewer points than Arsenal in 3rd.
        let rows = compute_standings(&seeded_db(), TournamentId(2)).unwrap();
        assert_eq!(
            team_names(&rows),
            vec!["Bayern", "Real Madrid", "Arsenal", "Chelsea"]
        );
        assert_eq!(positions(&rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn missing_positions_fall_back_to_points() {
        let rows = compute_standings(&seeded_db(), TournamentId(3)).unwrap();
        assert_eq!(team_names(&rows), vec!["Olympiacos", "Fenerbahce"]);
        assert_eq!(positions(&rows), vec![1, 2]);
    }

    #[test]
    fn duplicate_team_rows_are_collapsed() {
        let db = seeded_db_with(
            "INSERT INTO standings (tournament_id, team_id, position, points)
             VALUES (1, 3, 4, 99);",
        );
        let rows = compute_standings(&db, TournamentId(1)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(positions(&rows), vec![1, 2, 3]);
        assert_eq!(rows[1].points, 6);
    }

    #[test]
    fn gapped_positions_are_renumbered() {
        let db = seeded_db_with("UPDATE standings SET position = position * 10 WHERE tournament_id = 1;");
        let rows = compute_standings(&db, TournamentId(1)).unwrap();
        assert_eq!(positions(&rows), vec![1, 2, 3]);
        assert_eq!(team_names(&rows), vec!["Arsenal", "Liverpool", "Chelsea"]);
    }

    #[test]
    fn unknown_tournament_has_empty_table() {
        assert!(compute_standings(&seeded_db(), TournamentId(99)).unwrap().is_empty());
    }

    #[test]
    fn bands_follow_position_and_table_size() {
        let rules = BandRules::default();
        assert_eq!(rules.band(1, 20), Band::Qualification);
        assert_eq!(rules.band(4, 20), Band::Qualification);
        assert_eq!(rules.band(5, 20), Band::MidTable);
        assert_eq!(rules.band(17, 20), Band::MidTable);
        assert_eq!(rules.band(18, 20), Band::Relegation);
        assert_eq!(rules.band(20, 20), Band::Relegation);
        // Short table: top spots win the overlap.
        assert_eq!(rules.band(3, 5), Band::Qualification);
        assert_eq!(rules.band(5, 5), Band::Relegation);

        let no_relegation = BandRules {
            qualification_spots: 1,
            relegation_spots: 0,
        };
        assert_eq!(no_relegation.band(10, 10), Band::MidTable);
    }

    #[test]
    fn classify_pairs_rows_with_bands() {
        let rows = compute_standings(&seeded_db(), TournamentId(2)).unwrap();
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
}
