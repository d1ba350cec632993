// Round enumeration, paging and per-round match listing for a tournament.

use std::fmt;

use rusqlite::types::Value;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Match, TournamentId};
use crate::store::QueryInterface;

/// Which slice of a tournament's schedule is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundSelection {
    /// Every match, regardless of round.
    All,
    Round(u32),
}

impl RoundSelection {
    pub fn round(&self) -> Option<u32> {
        match self {
            RoundSelection::All => None,
            RoundSelection::Round(n) => Some(*n),
        }
    }
}

impl fmt::Display for RoundSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundSelection::All => write!(f, "all rounds"),
            RoundSelection::Round(n) => write!(f, "round {n}"),
        }
    }
}

/// Selection made when a tournament is entered: the last (most recent) round,
/// or every match when no match carries a round.
pub fn default_round(rounds: &[u32]) -> RoundSelection {
    rounds
        .iter()
        .max()
        .map_or(RoundSelection::All, |&n| RoundSelection::Round(n))
}

/// Distinct round numbers present among the tournament's matches, ascending.
pub fn list_rounds<Q: QueryInterface>(store: &Q, tournament: TournamentId) -> Result<Vec<u32>> {
    store.select_map(
        "list_rounds",
        "SELECT DISTINCT round FROM matches
         WHERE tournament_id = ?1 AND round IS NOT NULL
         ORDER BY round",
        &[tournament.into()],
        |row| row.get(0),
    )
}

/// Matches of a tournament, most recent first. `round = None` lists all of them.
pub fn list_matches<Q: QueryInterface>(
    store: &Q,
    tournament: TournamentId,
    round: Option<u32>,
) -> Result<Vec<Match>> {
    match round {
        Some(round) => store.select_map(
            "list_matches",
            &format!(
                "SELECT {} FROM {}
                 WHERE m.tournament_id = ?1 AND m.round = ?2
                 ORDER BY date(m.date) DESC, m.id DESC",
                Match::COLUMNS,
                Match::FROM
            ),
            &[tournament.into(), Value::Integer(i64::from(round))],
            Match::from_row,
        ),
        None => store.select_map(
            "list_matches",
            &format!(
                "SELECT {} FROM {}
                 WHERE m.tournament_id = ?1
                 ORDER BY date(m.date) DESC, m.id DESC",
                Match::COLUMNS,
                Match::FROM
            ),
            &[tournament.into()],
            Match::from_row,
        ),
    }
}

// ---------------------------------------------------------------------------
// Round paging
// ---------------------------------------------------------------------------

/// Number of pages needed to show `count` rounds.
pub fn page_count(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamp `page` into `[0, page_count - 1]` (0 when there are no rounds).
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.min(page_count(count, page_size).saturating_sub(1))
}

/// Fixed-size pages over a tournament's ascending round list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundPager {
    rounds: Vec<u32>,
    page_size: usize,
    page: usize,
}

impl RoundPager {
    pub fn new(rounds: Vec<u32>, page_size: usize) -> Self {
        Self {
            rounds,
            page_size: page_size.max(1),
            page: 0,
        }
    }

    pub fn rounds(&self) -> &[u32] {
        &self.rounds
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.rounds.len(), self.page_size)
    }

    /// Jump to `page`, clamped; returns the page actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = clamp_page(page, self.rounds.len(), self.page_size);
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Rounds on the current page.
    pub fn visible(&self) -> &[u32] {
        let start = (self.page * self.page_size).min(self.rounds.len());
        let end = (start + self.page_size).min(self.rounds.len());
        &self.rounds[start..end]
    }

    /// Page that shows `round`, if the tournament has it.
    pub fn page_of(&self, round: u32) -> Option<usize> {
        self.rounds
            .iter()
            .position(|&r| r == round)
            .map(|idx| idx / self.page_size)
    }
}
