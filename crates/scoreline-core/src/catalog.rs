// Sport -> tournament -> match hierarchy with on-demand child loading.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Match, Sport, SportId, Tournament, TournamentId};
use crate::rounds;
use crate::store::QueryInterface;

/// Sports ordered alphabetically by name.
pub fn list_sports<Q: QueryInterface>(store: &Q) -> Result<Vec<Sport>> {
    store.select_map(
        "list_sports",
        "SELECT id, name FROM sports ORDER BY name, id",
        &[],
        |row| {
            Ok(Sport {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
}

/// Tournaments of one sport, alphabetically by name.
pub fn list_tournaments<Q: QueryInterface>(store: &Q, sport: SportId) -> Result<Vec<Tournament>> {
    store.select_map(
        "list_tournaments",
        "SELECT id, sport_id, name FROM tournaments WHERE sport_id = ?1 ORDER BY name, id",
        &[sport.into()],
        |row| {
            Ok(Tournament {
                id: row.get(0)?,
                sport_id: row.get(1)?,
                name: row.get(2)?,
            })
        },
    )
}

// ---------------------------------------------------------------------------
// Lazy tree
// ---------------------------------------------------------------------------

/// Materialization state of a node's children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "children", rename_all = "snake_case")]
pub enum Children<T> {
    /// Never expanded; nothing has been fetched.
    NotLoaded,
    /// A fetch is in flight.
    Loading,
    Loaded(Vec<T>),
}

impl<T> Children<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Children::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&[T]> {
        match self {
            Children::Loaded(items) => Some(items),
            _ => None,
        }
    }

    fn as_loaded_mut(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Children::Loaded(items) => Some(items),
            _ => None,
        }
    }

    /// Run `fetch` unless already loaded. A failed fetch returns the node to
    /// `NotLoaded` so the next expansion retries.
    fn ensure_loaded(&mut self, fetch: impl FnOnce() -> Result<Vec<T>>) -> Result<&[T]> {
        if !self.is_loaded() {
            *self = Children::Loading;
            match fetch() {
                Ok(items) => *self = Children::Loaded(items),
                Err(e) => {
                    *self = Children::NotLoaded;
                    return Err(e);
                }
            }
        }
        Ok(self.as_loaded().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SportNode {
    pub sport: Sport,
    pub tournaments: Children<TournamentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentNode {
    pub tournament: Tournament,
    /// All matches of the tournament, most recent first.
    pub matches: Children<Match>,
}

impl TournamentNode {
    fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            matches: Children::NotLoaded,
        }
    }
}

/// Session-lived catalog. Children are fetched on first expansion and kept
/// for the rest of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    sports: Vec<SportNode>,
}

impl Catalog {
    /// Load the root level (sports); nothing below it is fetched yet.
    pub fn load<Q: QueryInterface>(store: &Q) -> Result<Self> {
        let sports = list_sports(store)?
            .into_iter()
            .map(|sport| SportNode {
                sport,
                tournaments: Children::NotLoaded,
            })
            .collect();
        Ok(Self { sports })
    }

    pub fn sports(&self) -> &[SportNode] {
        &self.sports
    }

    pub fn sport(&self, id: SportId) -> Option<&SportNode> {
        self.sports.iter().find(|node| node.sport.id == id)
    }

    /// Expand a sport, fetching its tournaments on first use.
    pub fn expand_sport<Q: QueryInterface>(
        &mut self,
        store: &Q,
        id: SportId,
    ) -> Result<&[TournamentNode]> {
        let node = self
            .sports
            .iter_mut()
            .find(|node| node.sport.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "sport",
                key: id.to_string(),
            })?;

        if node.tournaments.is_loaded() {
            debug!("sport {id}: tournaments already loaded");
        }
        node.tournaments.ensure_loaded(|| {
            debug!("sport {id}: loading tournaments");
            Ok(list_tournaments(store, id)?
                .into_iter()
                .map(TournamentNode::new)
                .collect())
        })
    }

    /// Expand a tournament whose sport has already been expanded, fetching
    /// its matches on first use.
    pub fn expand_tournament<Q: QueryInterface>(
        &mut self,
        store: &Q,
        id: TournamentId,
    ) -> Result<&[Match]> {
        let node = self
            .sports
            .iter_mut()
            .filter_map(|sport| sport.tournaments.as_loaded_mut())
            .flat_map(|tournaments| tournaments.iter_mut())
            .find(|node| node.tournament.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "tournament",
                key: id.to_string(),
            })?;

        node.matches.ensure_loaded(|| {
            debug!("tournament {id}: loading matches");
            rounds::list_matches(store, id, None)
        })
    }

    /// Cached matches of a tournament, if it has been expanded.
    pub fn tournament_matches(&self, id: TournamentId) -> Option<&[Match]> {
        self.tournament_node(id).and_then(|node| node.matches.as_loaded())
    }

    fn tournament_node(&self, id: TournamentId) -> Option<&TournamentNode> {
        self.sports
            .iter()
            .filter_map(|sport| sport.tournaments.as_loaded())
            .flatten()
            .find(|node| node.tournament.id == id)
    }

    /// Look up a tournament among already-expanded sports.
    pub fn tournament(&self, id: TournamentId) -> Option<&Tournament> {
        self.tournament_node(id).map(|node| &node.tournament)
    }
}
