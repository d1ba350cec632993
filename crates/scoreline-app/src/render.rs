// Plain-text, JSON and CSV rendering of the aggregation results.

use std::fmt::Write as _;

use anyhow::Context;
use serde::Serialize;

use scoreline_core::catalog::{Catalog, Children};
use scoreline_core::form::{form_guide, HeadToHeadSummary};
use scoreline_core::lineups::{AlignedRow, LineupEntry};
use scoreline_core::match_view::MatchView;
use scoreline_core::model::{Match, Team};
use scoreline_core::navigation::TournamentContext;
use scoreline_core::rounds::RoundSelection;
use scoreline_core::standings::{Band, BandRules, StandingRow};
use scoreline_core::Section;

const NAME_WIDTH: usize = 22;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode JSON")
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Sports with `[+]` for collapsed and `[-]` for expanded nodes.
pub fn sports_tree(catalog: &Catalog) -> String {
    let mut out = String::new();
    for node in catalog.sports() {
        let marker = if node.tournaments.is_loaded() { "-" } else { "+" };
        let _ = writeln!(out, "[{marker}] {} (#{})", node.sport.name, node.sport.id);
        if let Children::Loaded(tournaments) = &node.tournaments {
            if tournaments.is_empty() {
                let _ = writeln!(out, "      (no tournaments)");
            }
            for t in tournaments {
                let _ = writeln!(out, "      {} (#{})", t.tournament.name, t.tournament.id);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tournament view
// ---------------------------------------------------------------------------

/// Round selector line: the current page of rounds with the selection in
/// brackets, e.g. `Rounds: 1 2 [3]  (page 1/1)`.
pub fn round_selector(context: &TournamentContext) -> String {
    let pager = context.pager();
    if pager.rounds().is_empty() {
        return "Rounds: none (all matches)".to_string();
    }
    let cells: Vec<String> = pager
        .visible()
        .iter()
        .map(|&n| match context.round {
            RoundSelection::Round(sel) if sel == n => format!("[{n}]"),
            _ => n.to_string(),
        })
        .collect();
    let all = if context.round == RoundSelection::All {
        "  [all]"
    } else {
        ""
    };
    format!(
        "Rounds: {}{all}  (page {}/{})",
        cells.join(" "),
        pager.page() + 1,
        pager.page_count()
    )
}

pub fn match_list(context: &TournamentContext, matches: &[Match]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", context.tournament.name, context.round);
    let _ = writeln!(out, "{}", round_selector(context));
    let _ = writeln!(out);
    if matches.is_empty() {
        let _ = writeln!(out, "  no matches");
    }
    for m in matches {
        let _ = writeln!(out, "  #{:<6} {}", m.id, m.headline());
    }
    out
}

#[derive(Serialize)]
struct MatchRecord<'a> {
    id: i64,
    date: String,
    round: Option<u32>,
    team1: &'a str,
    team2: &'a str,
    team1_score: Option<u32>,
    team2_score: Option<u32>,
}

pub fn matches_csv(matches: &[Match]) -> anyhow::Result<String> {
    write_csv(matches.iter().map(|m| MatchRecord {
        id: m.id.0,
        date: m.date.to_string(),
        round: m.round,
        team1: &m.team1.name,
        team2: &m.team2.name,
        team1_score: m.score.map(|s| s.team1),
        team2_score: m.score.map(|s| s.team2),
    }))
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

fn band_marker(band: Band) -> &'static str {
    match band {
        Band::Qualification => "Q",
        Band::MidTable => " ",
        Band::Relegation => "R",
    }
}

pub fn standings_table(rows: &[StandingRow], rules: &BandRules) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "   {:>3}  {:<NAME_WIDTH$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for (row, band) in rules.classify(rows) {
        let _ = writeln!(
            out,
            "{}  {:>3}  {:<NAME_WIDTH$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}",
            band_marker(band),
            row.position,
            row.team.name,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference(),
            row.points
        );
    }
    out
}

#[derive(Serialize)]
pub struct StandingRecord<'a> {
    position: u32,
    team_id: i64,
    team: &'a str,
    played: i64,
    wins: i64,
    draws: i64,
    losses: i64,
    goals_for: i64,
    goals_against: i64,
    goal_difference: i64,
    points: i64,
    band: Band,
}

pub fn standing_records<'a>(
    rows: &'a [StandingRow],
    rules: &'a BandRules,
) -> impl Iterator<Item = StandingRecord<'a>> + 'a {
    rules.classify(rows).map(|(row, band)| StandingRecord {
        position: row.position,
        team_id: row.team.id.0,
        team: &row.team.name,
        played: row.played,
        wins: row.wins,
        draws: row.draws,
        losses: row.losses,
        goals_for: row.goals_for,
        goals_against: row.goals_against,
        goal_difference: row.goal_difference(),
        points: row.points,
        band,
    })
}

pub fn standings_csv(rows: &[StandingRow], rules: &BandRules) -> anyhow::Result<String> {
    write_csv(standing_records(rows, rules))
}

fn write_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).context("failed to write CSV record")?;
    }
    let bytes = writer.into_inner().context("failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

// ---------------------------------------------------------------------------
// Match view
// ---------------------------------------------------------------------------

fn section_header(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {title} ==");
}

/// Placeholder line for a section that has nothing to show.
fn placeholder<T>(out: &mut String, section: &Section<T>) {
    match section {
        Section::Ready(_) => {}
        Section::Empty => {
            let _ = writeln!(out, "  no data");
        }
        Section::Failed(reason) => {
            let _ = writeln!(out, "  unavailable ({reason})");
        }
    }
}

fn lineup_cell(entry: Option<&LineupEntry>) -> String {
    match entry {
        Some(e) => {
            let number = e.jersey_number.map_or_else(|| "--".to_string(), |n| n.to_string());
            format!("{number:>3} {} {}", e.player, e.position)
        }
        None => String::new(),
    }
}

fn lineup_rows<'a>(out: &mut String, rows: impl Iterator<Item = AlignedRow<'a>>) {
    for (left, right) in rows {
        let _ = writeln!(
            out,
            "  {:<30} {}",
            lineup_cell(left),
            lineup_cell(right)
        );
    }
}

fn form_block(out: &mut String, team: &Team, section: &Section<Vec<Match>>) {
    let _ = writeln!(out, "{}:", team.name);
    match section.ready() {
        Some(matches) => {
            let _ = writeln!(out, "  {}", form_guide(matches, team.id));
            for m in matches {
                let _ = writeln!(out, "  {}", m.headline());
            }
        }
        None => placeholder(out, section),
    }
}

pub fn match_view(view: &MatchView) -> String {
    let summary = &view.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.headline());
    if let Some(round) = summary.round {
        let _ = writeln!(out, "Round {round}");
    }

    section_header(&mut out, "Statistics");
    match view.statistics.ready() {
        Some(pivot) => {
            let _ = writeln!(
                out,
                "  {:>8}  {:^20}  {:<8}",
                summary.team1.name, "", summary.team2.name
            );
            for line in &pivot.lines {
                let _ = writeln!(
                    out,
                    "  {:>8}  {:^20}  {:<8}",
                    line.team1.to_string(),
                    line.name,
                    line.team2.to_string()
                );
            }
        }
        None => placeholder(&mut out, &view.statistics),
    }

    section_header(&mut out, "Timeline");
    match view.timeline.ready() {
        Some(events) => {
            for event in events {
                let _ = writeln!(out, "  {}", event.summary());
            }
        }
        None => placeholder(&mut out, &view.timeline),
    }

    section_header(&mut out, "Lineups");
    match view.lineups.ready() {
        Some(lineups) => {
            let _ = writeln!(
                out,
                "  {:<30} {}",
                summary.team1.name, summary.team2.name
            );
            lineup_rows(&mut out, lineups.aligned_starters());
            let _ = writeln!(out, "  -- substitutes --");
            lineup_rows(&mut out, lineups.aligned_substitutes());
        }
        None => placeholder(&mut out, &view.lineups),
    }

    section_header(&mut out, "Form");
    form_block(&mut out, &summary.team1, &view.team1_form);
    form_block(&mut out, &summary.team2, &view.team2_form);

    section_header(&mut out, "Head to head");
    match view.head_to_head.ready() {
        Some(matches) => {
            if let Some(tally) = view.head_to_head_summary() {
                let _ = writeln!(
                    out,
                    "  {}",
                    tally_line(&summary.team1, &summary.team2, &tally)
                );
            }
            for m in matches {
                let _ = writeln!(out, "  {}", m.headline());
            }
        }
        None => placeholder(&mut out, &view.head_to_head),
    }
    out
}

// ---------------------------------------------------------------------------
// Form and head-to-head commands
// ---------------------------------------------------------------------------

pub fn form_list(team: &Team, matches: &[Match]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} form: {}", team.name, form_guide(matches, team.id));
    for m in matches {
        let _ = writeln!(out, "  {}", m.headline());
    }
    out
}

fn tally_line(a: &Team, b: &Team, tally: &HeadToHeadSummary) -> String {
    let mut line = format!(
        "{} {} wins, {} {} wins, {} draws",
        a.name, tally.a_wins, b.name, tally.b_wins, tally.draws
    );
    if tally.unplayed > 0 {
        let _ = write!(line, ", {} unplayed", tally.unplayed);
    }
    line
}

pub fn head_to_head_list(a: &Team, b: &Team, matches: &[Match]) -> String {
    let mut out = String::new();
    let tally = HeadToHeadSummary::tally(matches, a.id);
    let _ = writeln!(out, "{}", tally_line(a, b, &tally));
    for m in matches {
        let _ = writeln!(out, "  {}", m.headline());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scoreline_core::model::{MatchId, Score, SportId, TeamId, Tournament, TournamentId};

    fn team(id: i64, name: &str) -> Team {
        Team {
            id: TeamId(id),
            name: name.into(),
        }
    }

    fn game(id: i64, score: Option<(u32, u32)>) -> Match {
        Match {
            id: MatchId(id),
            tournament_id: TournamentId(2),
            date: NaiveDate::from_ymd_opt(2024, 3, id as u32 % 28 + 1).unwrap(),
            round: Some(1),
            team1: team(1, "Arsenal"),
            team2: team(2, "Chelsea"),
            score: score.map(|(a, b)| Score { team1: a, team2: b }),
        }
    }

    fn context(rounds: Vec<u32>) -> TournamentContext {
        TournamentContext::enter(
            Tournament {
                id: TournamentId(2),
                sport_id: SportId(1),
                name: "Champions League".into(),
            },
            rounds,
            5,
        )
    }

    #[test]
    fn selector_brackets_current_round() {
        assert_eq!(
            round_selector(&context(vec![1, 2, 3])),
            "Rounds: 1 2 [3]  (page 1/1)"
        );
        assert_eq!(round_selector(&context(vec![])), "Rounds: none (all matches)");
    }

    #[test]
    fn match_list_uses_headlines() {
        let text = match_list(&context(vec![1]), &[game(1, Some((2, 1))), game(2, None)]);
        assert!(text.starts_with("Champions League - round 1\n"));
        assert!(text.contains("Arsenal 2 - 1 Chelsea"));
        assert!(text.contains("Arsenal vs Chelsea"));
    }

    #[test]
    fn csv_has_header_and_blank_scores() {
        let csv = matches_csv(&[game(5, None)]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,round,team1,team2,team1_score,team2_score")
        );
        assert_eq!(lines.next(), Some("5,2024-03-06,1,Arsenal,Chelsea,,"));
    }

    #[test]
    fn head_to_head_tally_line() {
        let text = head_to_head_list(
            &team(1, "Arsenal"),
            &team(2, "Chelsea"),
            &[game(1, Some((2, 0))), game(2, Some((1, 1))), game(3, None)],
        );
        assert!(text.starts_with("Arsenal 1 wins, Chelsea 0 wins, 1 draws, 1 unplayed\n"));
    }

    #[test]
    fn placeholder_shows_failure_reason() {
        let mut out = String::new();
        placeholder::<()>(&mut out, &Section::Failed("query failed".into()));
        assert_eq!(out, "  unavailable (query failed)\n");
    }
}
