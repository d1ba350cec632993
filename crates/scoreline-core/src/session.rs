// Viewer session: one store handle, the lazily loaded catalog, and the
// navigation state, driven by serialized user transitions.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, TournamentNode};
use crate::config::ViewConfig;
use crate::error::Error;
use crate::lookup::tournament_by_id;
use crate::match_view::{load_match_view, MatchView};
use crate::model::{Match, MatchId, SportId, TournamentId};
use crate::navigation::{NavError, Navigator, Screen, TournamentContext};
use crate::rounds::{list_matches, list_rounds, RoundSelection};
use crate::standings::{compute_standings, StandingRow};
use crate::store::QueryInterface;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] Error),

    #[error(transparent)]
    Navigation(#[from] NavError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// A store plus "where the user is". Every transition first fetches what it
/// needs and only then moves the navigator, so a failed query leaves the
/// session on the screen it was on.
pub struct Session<Q> {
    store: Q,
    view: ViewConfig,
    catalog: Catalog,
    nav: Navigator,
}

impl<Q: QueryInterface> Session<Q> {
    /// Open a session at the sport list.
    pub fn start(store: Q, view: ViewConfig) -> SessionResult<Self> {
        let catalog = Catalog::load(&store)?;
        info!("session started with {} sports", catalog.sports().len());
        Ok(Self {
            store,
            view,
            catalog,
            nav: Navigator::new(),
        })
    }

    pub fn store(&self) -> &Q {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn screen(&self) -> &Screen {
        self.nav.screen()
    }

    pub fn context(&self) -> Option<&TournamentContext> {
        self.nav.screen().context()
    }

    fn open_context(&self, action: &'static str) -> SessionResult<&TournamentContext> {
        self.context().ok_or_else(|| {
            NavError::InvalidTransition {
                action,
                from: self.screen().name(),
            }
            .into()
        })
    }

    /// Expand a sport (tournaments fetched on first expansion) and show its
    /// tournament list.
    pub fn select_sport(&mut self, sport: SportId) -> SessionResult<&[TournamentNode]> {
        self.catalog.expand_sport(&self.store, sport)?;
        self.nav.select_sport(sport)?;
        Ok(self
            .catalog
            .sport(sport)
            .and_then(|node| node.tournaments.as_loaded())
            .unwrap_or_default())
    }

    /// Enter a tournament: rounds are listed and the selection reset to the
    /// last round on the first page. A failed round listing leaves the
    /// selector empty (every match) without blocking the standings.
    pub fn select_tournament(&mut self, id: TournamentId) -> SessionResult<&TournamentContext> {
        let tournament = match self.catalog.tournament(id) {
            Some(t) => t.clone(),
            None => tournament_by_id(&self.store, id)?,
        };
        let rounds = list_rounds(&self.store, id).unwrap_or_else(|e| {
            warn!("tournament {id}: round selector unavailable: {e}");
            Vec::new()
        });
        self.nav
            .select_tournament(tournament, rounds, self.view.round_page_size)?;
        self.open_context("select a tournament")
    }

    /// Select a round and list its matches. "All" is served from the catalog
    /// when the tournament sits in an expanded sport.
    pub fn select_round(&mut self, round: RoundSelection) -> SessionResult<Vec<Match>> {
        self.nav.select_round(round)?;
        let id = self.open_context("select a round")?.tournament.id;
        if round == RoundSelection::All && self.catalog.tournament(id).is_some() {
            return Ok(self.catalog.expand_tournament(&self.store, id)?.to_vec());
        }
        self.current_matches()
    }

    pub fn set_page(&mut self, page: usize) -> SessionResult<usize> {
        Ok(self.nav.set_page(page)?)
    }

    /// Matches of the open tournament for the selected round, newest first.
    pub fn current_matches(&self) -> SessionResult<Vec<Match>> {
        let context = self.open_context("list matches")?;
        let id = context.tournament.id;
        let round = context.round.round();
        if round.is_none() {
            if let Some(cached) = self.catalog.tournament_matches(id) {
                return Ok(cached.to_vec());
            }
        }
        Ok(list_matches(&self.store, id, round)?)
    }

    /// Standings of the open tournament.
    pub fn standings(&self) -> SessionResult<Vec<StandingRow>> {
        let context = self.open_context("show standings")?;
        Ok(compute_standings(&self.store, context.tournament.id)?)
    }

    /// Open a match of the current tournament and load its view.
    pub fn select_match(&mut self, id: MatchId) -> SessionResult<MatchView> {
        self.open_context("select a match")?;
        let view = load_match_view(&self.store, id, &self.view)?;
        self.nav.select_match(id, view.summary.tournament_id)?;
        debug!("session: showing {}", view.summary.headline());
        Ok(view)
    }

    pub fn back(&mut self) -> SessionResult<&Screen> {
        self.nav.back()?;
        Ok(self.nav.screen())
    }
}
