// Starter/substitute partition of a match's lineups.

use std::iter;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{MatchId, PlayerRef, TeamId};
use crate::store::QueryInterface;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineupEntry {
    pub player: PlayerRef,
    pub jersey_number: Option<u32>,
    pub position: String,
    pub is_starting: bool,
}

/// One team's lineup, each group in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLineup {
    pub team_id: TeamId,
    pub starters: Vec<LineupEntry>,
    pub substitutes: Vec<LineupEntry>,
}

impl TeamLineup {
    fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            starters: Vec::new(),
            substitutes: Vec::new(),
        }
    }

    fn push(&mut self, entry: LineupEntry) {
        if entry.is_starting {
            self.starters.push(entry);
        } else {
            self.substitutes.push(entry);
        }
    }
}

/// Sizes of the four groups, enough to lay out aligned columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupSizes {
    pub team1_starters: usize,
    pub team1_substitutes: usize,
    pub team2_starters: usize,
    pub team2_substitutes: usize,
}

impl GroupSizes {
    /// Rows needed to show both starter columns side by side.
    pub fn starter_rows(&self) -> usize {
        self.team1_starters.max(self.team2_starters)
    }

    pub fn substitute_rows(&self) -> usize {
        self.team1_substitutes.max(self.team2_substitutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lineups {
    pub team1: TeamLineup,
    pub team2: TeamLineup,
}

/// One display row of two aligned columns; `None` is a blank cell.
pub type AlignedRow<'a> = (Option<&'a LineupEntry>, Option<&'a LineupEntry>);

impl Lineups {
    pub fn sizes(&self) -> GroupSizes {
        GroupSizes {
            team1_starters: self.team1.starters.len(),
            team1_substitutes: self.team1.substitutes.len(),
            team2_starters: self.team2.starters.len(),
            team2_substitutes: self.team2.substitutes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        let sizes = self.sizes();
        sizes.starter_rows() == 0 && sizes.substitute_rows() == 0
    }

    pub fn aligned_starters(&self) -> impl Iterator<Item = AlignedRow<'_>> {
        align(&self.team1.starters, &self.team2.starters)
    }

    pub fn aligned_substitutes(&self) -> impl Iterator<Item = AlignedRow<'_>> {
        align(&self.team1.substitutes, &self.team2.substitutes)
    }
}

fn align<'a>(
    left: &'a [LineupEntry],
    right: &'a [LineupEntry],
) -> impl Iterator<Item = AlignedRow<'a>> {
    let rows = left.len().max(right.len());
    let mut left = left.iter();
    let mut right = right.iter();
    iter::repeat_with(move || (left.next(), right.next())).take(rows)
}

/// Split `(team, entry)` rows into the four groups, preserving input order.
/// Rows for any other team are dropped.
pub fn partition(
    rows: impl IntoIterator<Item = (TeamId, LineupEntry)>,
    team1: TeamId,
    team2: TeamId,
) -> Lineups {
    let mut lineups = Lineups {
        team1: TeamLineup::new(team1),
        team2: TeamLineup::new(team2),
    };
    for (team, entry) in rows {
        if team == team1 {
            lineups.team1.push(entry);
        } else if team == team2 {
            lineups.team2.push(entry);
        } else {
            debug!("dropping lineup row for team {team}, not part of {team1} v {team2}");
        }
    }
    lineups
}

/// Fetch and partition the lineups of a match.
pub fn load_lineups<Q: QueryInterface>(
    store: &Q,
    match_id: MatchId,
    team1: TeamId,
    team2: TeamId,
) -> Result<Lineups> {
    let rows = store.select_map(
        "load_lineups",
        "SELECT l.team_id, l.player_id, p.name, l.jersey_number, l.position, l.is_starting
         FROM lineups l
         LEFT JOIN players p ON p.id = l.player_id
         WHERE l.match_id = ?1 AND l.team_id IN (?2, ?3)
         ORDER BY l.rowid",
        &[match_id.into(), team1.into(), team2.into()],
        |row| {
            let team: TeamId = row.get(0)?;
            Ok((
                team,
                LineupEntry {
                    player: PlayerRef::from_columns(row.get(1)?, row.get(2)?),
                    jersey_number: row.get(3)?,
                    position: row.get::<Option<String>>(4)?.unwrap_or_default(),
                    is_starting: row.get(5)?,
                },
            ))
        },
    )?;
    Ok(partition(rows, team1, team2))
}
