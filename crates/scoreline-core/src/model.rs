// Shapes of the read-only sports records the aggregation layer consumes.

use std::fmt;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlResult, Value, ValueRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::Row;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<$name> for Value {
            fn from(id: $name) -> Value {
                Value::Integer(id.0)
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(SportId);
id_type!(TournamentId);
id_type!(
    /// Stable team identity. Names are display-only.
    TeamId
);
id_type!(MatchId);
id_type!(PlayerId);

// ---------------------------------------------------------------------------
// Catalog entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sport {
    pub id: SportId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub sport_id: SportId,
    pub name: String,
}

/// A team as referenced by a match, standing or lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// Marker shown when an event or lineup row carries no player.
pub const UNKNOWN_PLAYER: &str = "unknown player";

/// A player reference that may be missing from the source row.
///
/// `Unknown` means "no player recorded", which is distinct from a recorded
/// player whose name happens to be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerRef {
    Known { id: PlayerId, name: String },
    Unknown,
}

impl PlayerRef {
    /// Build from the nullable `player_id` column and the joined player name.
    pub fn from_columns(id: Option<PlayerId>, name: Option<String>) -> Self {
        match id {
            Some(id) => PlayerRef::Known {
                id,
                name: name.unwrap_or_else(|| format!("player #{id}")),
            },
            None => PlayerRef::Unknown,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PlayerRef::Known { name, .. } => name,
            PlayerRef::Unknown => UNKNOWN_PLAYER,
        }
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// Final score, ordered team1 then team2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

impl Score {
    /// Parse the stored `"a:b"` form. `"a-b"` is accepted too; anything else
    /// (including blank text for unplayed matches) yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (a, b) = raw.trim().split_once(|c: char| c == ':' || c == '-')?;
        Some(Score {
            team1: a.trim().parse().ok()?,
            team2: b.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.team1, self.team2)
    }
}

/// Result of a played match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn letter(&self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub date: NaiveDate,
    /// Absent for round-less competitions.
    pub round: Option<u32>,
    pub team1: Team,
    pub team2: Team,
    /// Absent until the match has been played.
    pub score: Option<Score>,
}

impl Match {
    /// Column list every match query selects, in the order [`Match::from_row`]
    /// decodes. Expects `matches m`, `teams t1` and `teams t2` in the FROM clause.
    pub(crate) const COLUMNS: &'static str = "m.id, m.tournament_id, date(m.date), m.round, \
         m.team1_id, COALESCE(t1.name, ''), m.team2_id, COALESCE(t2.name, ''), m.score";

    /// FROM clause matching [`Match::COLUMNS`].
    pub(crate) const FROM: &'static str = "matches m \
         LEFT JOIN teams t1 ON t1.id = m.team1_id \
         LEFT JOIN teams t2 ON t2.id = m.team2_id";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let id: MatchId = row.get(0)?;
        let raw_score: Option<String> = row.get(8)?;
        let score = raw_score.as_deref().and_then(|raw| {
            let parsed = Score::parse(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                debug!("match {id}: ignoring unparseable score {raw:?}");
            }
            parsed
        });
        Ok(Match {
            id,
            tournament_id: row.get(1)?,
            date: row.get(2)?,
            round: row.get(3)?,
            team1: Team {
                id: row.get(4)?,
                name: row.get(5)?,
            },
            team2: Team {
                id: row.get(6)?,
                name: row.get(7)?,
            },
            score,
        })
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team1.id == team || self.team2.id == team
    }

    /// Whether this match was played between `a` and `b`, in either order.
    pub fn is_between(&self, a: TeamId, b: TeamId) -> bool {
        (self.team1.id == a && self.team2.id == b) || (self.team1.id == b && self.team2.id == a)
    }

    /// The other side of the match, if `team` played in it.
    pub fn opponent_of(&self, team: TeamId) -> Option<&Team> {
        if self.team1.id == team {
            Some(&self.team2)
        } else if self.team2.id == team {
            Some(&self.team1)
        } else {
            None
        }
    }

    /// Outcome for `team`; `None` when unplayed or when `team` did not play.
    pub fn outcome_for(&self, team: TeamId) -> Option<Outcome> {
        let score = self.score?;
        let (own, other) = if self.team1.id == team {
            (score.team1, score.team2)
        } else if self.team2.id == team {
            (score.team2, score.team1)
        } else {
            return None;
        };
        Some(match own.cmp(&other) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        })
    }

    /// One-line summary, e.g. `2024-05-12: Arsenal 2 - 1 Chelsea`.
    pub fn headline(&self) -> String {
        match self.score {
            Some(score) => format!(
                "{}: {} {} - {} {}",
                self.date, self.team1.name, score.team1, score.team2, self.team2.name
            ),
            None => format!("{}: {} vs {}", self.date, self.team1.name, self.team2.name),
        }
    }
}
