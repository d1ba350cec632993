// Composite match view: summary plus every per-match aggregation.
//
// The summary is mandatory; each remaining section is caught at its own
// boundary so one failing query leaves the siblings intact.

use serde::Serialize;
use tracing::debug;

use crate::config::ViewConfig;
use crate::error::{Result, Section};
use crate::form::{form_guide, head_to_head, recent_form, HeadToHeadSummary};
use crate::lineups::{load_lineups, Lineups};
use crate::lookup::match_by_id;
use crate::model::{Match, MatchId, TeamId};
use crate::stats::{pivot_match_stats, StatsPivot};
use crate::store::QueryInterface;
use crate::timeline::{list_events, TimelineEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    pub summary: Match,
    pub statistics: Section<StatsPivot>,
    pub timeline: Section<Vec<TimelineEntry>>,
    pub lineups: Section<Lineups>,
    /// Team 1's matches before this one, most recent first.
    pub team1_form: Section<Vec<Match>>,
    pub team2_form: Section<Vec<Match>>,
    pub head_to_head: Section<Vec<Match>>,
}

impl MatchView {
    pub fn team1_guide(&self) -> Option<String> {
        guide(&self.team1_form, self.summary.team1.id)
    }

    pub fn team2_guide(&self) -> Option<String> {
        guide(&self.team2_form, self.summary.team2.id)
    }

    /// Head-to-head tally from team 1's side.
    pub fn head_to_head_summary(&self) -> Option<HeadToHeadSummary> {
        self.head_to_head
            .ready()
            .map(|matches| HeadToHeadSummary::tally(matches, self.summary.team1.id))
    }

    /// Sections that failed to load, by name.
    pub fn failed_sections(&self) -> Vec<&'static str> {
        [
            ("statistics", self.statistics.is_failed()),
            ("timeline", self.timeline.is_failed()),
            ("lineups", self.lineups.is_failed()),
            ("team1 form", self.team1_form.is_failed()),
            ("team2 form", self.team2_form.is_failed()),
            ("head to head", self.head_to_head.is_failed()),
        ]
        .into_iter()
        .filter_map(|(name, failed)| failed.then_some(name))
        .collect()
    }
}

fn guide(section: &Section<Vec<Match>>, team: TeamId) -> Option<String> {
    section.ready().map(|matches| form_guide(matches, team))
}

/// Load a match and everything shown alongside it.
///
/// Fails only when the match itself cannot be read; sub-view failures are
/// logged and surface as `Section::Failed`.
pub fn load_match_view<Q: QueryInterface>(
    store: &Q,
    id: MatchId,
    view: &ViewConfig,
) -> Result<MatchView> {
    let summary = match_by_id(store, id)?;
    let (team1, team2) = (summary.team1.id, summary.team2.id);
    debug!("match view {id}: {}", summary.headline());

    let statistics = Section::from_result(
        "statistics",
        pivot_match_stats(store, id, team1, team2),
        StatsPivot::is_empty,
    );
    let timeline = Section::from_list("timeline", list_events(store, id));
    let lineups = Section::from_result(
        "lineups",
        load_lineups(store, id, team1, team2),
        Lineups::is_empty,
    );
    let team1_form = Section::from_list(
        "team1 form",
        recent_form(store, team1, summary.date, view.form_limit),
    );
    let team2_form = Section::from_list(
        "team2 form",
        recent_form(store, team2, summary.date, view.form_limit),
    );
    let head_to_head = Section::from_list(
        "head to head",
        head_to_head(store, team1, team2, summary.date, view.head_to_head_limit),
    );

    Ok(MatchView {
        summary,
        statistics,
        timeline,
        lineups,
        team1_form,
        team2_form,
        head_to_head,
    })
}
