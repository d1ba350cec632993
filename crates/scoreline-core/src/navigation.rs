// Navigation state machine: sport list -> tournament list -> tournament view
// -> match view, and back.
//
// Pure state: no store access. The session drives it after fetching whatever a
// transition needs, so a failed fetch never leaves a half-applied transition.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{MatchId, SportId, Tournament, TournamentId};
use crate::rounds::{default_round, RoundPager, RoundSelection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("cannot {action} from the {from} screen")]
    InvalidTransition {
        action: &'static str,
        from: &'static str,
    },

    #[error("tournament {tournament} does not belong to sport {sport}")]
    ForeignTournament {
        tournament: TournamentId,
        sport: SportId,
    },

    #[error("tournament {tournament} has no round {round}")]
    UnknownRound { tournament: TournamentId, round: u32 },

    #[error("match {match_id} is not part of tournament {tournament}")]
    ForeignMatch {
        match_id: MatchId,
        tournament: TournamentId,
    },
}

/// Selection state of an open tournament. Rebuilt from scratch every time a
/// tournament is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentContext {
    pub tournament: Tournament,
    pub round: RoundSelection,
    pager: RoundPager,
}

impl TournamentContext {
    /// Entering a tournament: last round selected, first page of rounds shown.
    pub fn enter(tournament: Tournament, rounds: Vec<u32>, page_size: usize) -> Self {
        Self {
            round: default_round(&rounds),
            pager: RoundPager::new(rounds, page_size),
            tournament,
        }
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn pager(&self) -> &RoundPager {
        &self.pager
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    SportList,
    TournamentList { sport: SportId },
    TournamentView { context: TournamentContext },
    MatchView {
        context: TournamentContext,
        match_id: MatchId,
    },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::SportList => "sport list",
            Screen::TournamentList { .. } => "tournament list",
            Screen::TournamentView { .. } => "tournament view",
            Screen::MatchView { .. } => "match view",
        }
    }

    /// The open tournament, in the tournament and match views.
    pub fn context(&self) -> Option<&TournamentContext> {
        match self {
            Screen::TournamentView { context } | Screen::MatchView { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}

/// Owns the current screen and applies transitions to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigator {
    screen: Screen,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            screen: Screen::SportList,
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    fn invalid(&self, action: &'static str) -> NavError {
        NavError::InvalidTransition {
            action,
            from: self.screen.name(),
        }
    }

    fn context_mut(&mut self, action: &'static str) -> Result<&mut TournamentContext, NavError> {
        let from = self.screen.name();
        match &mut self.screen {
            Screen::TournamentView { context } => Ok(context),
            _ => Err(NavError::InvalidTransition { action, from }),
        }
    }

    /// Open a sport's tournament list. Allowed from the sport list, or from
    /// another sport's tournament list.
    pub fn select_sport(&mut self, sport: SportId) -> Result<(), NavError> {
        match self.screen {
            Screen::SportList | Screen::TournamentList { .. } => {
                debug!("navigate: sport {sport}");
                self.screen = Screen::TournamentList { sport };
                Ok(())
            }
            _ => Err(self.invalid("select a sport")),
        }
    }

    /// Enter a tournament with fresh round/page state. From a tournament list
    /// the tournament must belong to that sport; from an open tournament view
    /// this switches tournaments.
    pub fn select_tournament(
        &mut self,
        tournament: Tournament,
        rounds: Vec<u32>,
        page_size: usize,
    ) -> Result<(), NavError> {
        match &self.screen {
            Screen::TournamentList { sport } if *sport != tournament.sport_id => {
                return Err(NavError::ForeignTournament {
                    tournament: tournament.id,
                    sport: *sport,
                });
            }
            Screen::TournamentList { .. } | Screen::TournamentView { .. } => {}
            _ => return Err(self.invalid("select a tournament")),
        }

        let context = TournamentContext::enter(tournament, rounds, page_size);
        debug!(
            "navigate: tournament {} ({}), page {}",
            context.tournament.id,
            context.round,
            context.page()
        );
        self.screen = Screen::TournamentView { context };
        Ok(())
    }

    /// Change the selected round; the round page is left where it is.
    pub fn select_round(&mut self, round: RoundSelection) -> Result<(), NavError> {
        let context = self.context_mut("select a round")?;
        if let RoundSelection::Round(n) = round {
            if !context.pager.rounds().contains(&n) {
                return Err(NavError::UnknownRound {
                    tournament: context.tournament.id,
                    round: n,
                });
            }
        }
        context.round = round;
        Ok(())
    }

    /// Move the round selector to `page`, clamped; returns the page shown.
    pub fn set_page(&mut self, page: usize) -> Result<usize, NavError> {
        let context = self.context_mut("change the round page")?;
        Ok(context.pager.set_page(page))
    }

    /// Open a match of the current tournament.
    pub fn select_match(
        &mut self,
        match_id: MatchId,
        tournament: TournamentId,
    ) -> Result<(), NavError> {
        let context = self.context_mut("select a match")?;
        if context.tournament.id != tournament {
            return Err(NavError::ForeignMatch {
                match_id,
                tournament: context.tournament.id,
            });
        }
        let context = context.clone();
        debug!("navigate: match {match_id}");
        self.screen = Screen::MatchView { context, match_id };
        Ok(())
    }

    /// Match view returns to its tournament with the selection it had; every
    /// other screen returns to the sport list.
    pub fn back(&mut self) -> Result<(), NavError> {
        let next = match &self.screen {
            Screen::MatchView { context, .. } => Screen::TournamentView {
                context: context.clone(),
            },
            Screen::TournamentView { .. } | Screen::TournamentList { .. } => Screen::SportList,
            Screen::SportList => return Err(self.invalid("go back")),
        };
        debug!("navigate: back to {}", next.name());
        self.screen = next;
        Ok(())
    }
}
