// Two-column (team1 vs team2) comparison of per-team match statistics.

use std::fmt;

use rusqlite::types::Value;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::model::{MatchId, TeamId};
use crate::store::QueryInterface;

/// One side of a statistic comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Value(String),
    /// The team reported no row for this statistic.
    NoData,
}

impl StatValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StatValue::Value(v) => Some(v),
            StatValue::NoData => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Value(v) => f.write_str(v),
            StatValue::NoData => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub name: String,
    pub team1: StatValue,
    pub team2: StatValue,
}

/// A (team, statistic) pair reported more than once for the same match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateStat {
    pub team_id: TeamId,
    pub name: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsPivot {
    /// One line per distinct statistic, in first-reported order.
    pub lines: Vec<StatLine>,
    /// Duplicated inputs; the first reported value was used for each.
    pub duplicates: Vec<DuplicateStat>,
}

impl StatsPivot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, name: &str) -> Option<&StatLine> {
        self.lines.iter().find(|line| line.name == name)
    }
}

/// Pivot a match's statistics into `{name, team1, team2}` lines.
///
/// Each side is looked up by its own team id with a correlated subquery per
/// statistic name, so the two sides never cross-join. Rows from teams other
/// than `team1`/`team2` are ignored. When a team reported the same statistic
/// more than once, its earliest row wins and the duplicate is reported.
pub fn pivot_match_stats<Q: QueryInterface>(
    store: &Q,
    match_id: MatchId,
    team1: TeamId,
    team2: TeamId,
) -> Result<StatsPivot> {
    let params: [Value; 3] = [match_id.into(), team1.into(), team2.into()];

    let lines = store.select_map(
        "pivot_match_stats",
        "SELECT ms.stat_name,
                (SELECT COALESCE(CAST(s.stat_value AS TEXT), '')
                   FROM match_stats s
                  WHERE s.match_id = ?1 AND s.team_id = ?2 AND s.stat_name = ms.stat_name
                  ORDER BY s.rowid LIMIT 1),
                (SELECT COALESCE(CAST(s.stat_value AS TEXT), '')
                   FROM match_stats s
                  WHERE s.match_id = ?1 AND s.team_id = ?3 AND s.stat_name = ms.stat_name
                  ORDER BY s.rowid LIMIT 1)
         FROM match_stats ms
         WHERE ms.match_id = ?1 AND ms.team_id IN (?2, ?3)
         GROUP BY ms.stat_name
         ORDER BY MIN(ms.rowid)",
        &params,
        |row| {
            let side = |value: Option<String>| value.map_or(StatValue::NoData, StatValue::Value);
            Ok(StatLine {
                name: row.get(0)?,
                team1: side(row.get(1)?),
                team2: side(row.get(2)?),
            })
        },
    )?;

    let duplicates = store.select_map(
        "pivot_match_stats_duplicates",
        "SELECT team_id, stat_name, COUNT(*)
         FROM match_stats
         WHERE match_id = ?1 AND team_id IN (?2, ?3)
         GROUP BY team_id, stat_name
         HAVING COUNT(*) > 1
         ORDER BY MIN(rowid)",
        &params,
        |row| {
            Ok(DuplicateStat {
                team_id: row.get(0)?,
                name: row.get(1)?,
                rows: row.get::<i64>(2)?.try_into().unwrap_or(usize::MAX),
            })
        },
    )?;

    for dup in &duplicates {
        warn!(
            "match {match_id}: team {} reported `{}` {} times, using the first",
            dup.team_id, dup.name, dup.rows
        );
    }

    Ok(StatsPivot { lines, duplicates })
}
