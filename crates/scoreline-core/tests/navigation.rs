// End-to-end browsing through a session: catalog, tournament view, match view.

mod common;

use scoreline_core::catalog::Children;
use scoreline_core::config::ViewConfig;
use scoreline_core::model::{MatchId, SportId, TournamentId};
use scoreline_core::navigation::Screen;
use scoreline_core::rounds::RoundSelection;
use scoreline_core::session::{Session, SessionError};
use scoreline_core::Database;

const FOOTBALL: SportId = SportId(1);
const CHAMPIONS_LEAGUE: TournamentId = TournamentId(2);

fn start() -> Session<Database> {
    Session::start(common::seeded(), ViewConfig::default()).expect("session should start")
}

fn match_ids(session: &Session<Database>) -> Vec<i64> {
    session
        .current_matches()
        .unwrap()
        .iter()
        .map(|m| m.id.0)
        .collect()
}

#[test]
fn champions_league_round_selection_resets_on_reentry() {
    let mut session = start();
    session.select_sport(FOOTBALL).unwrap();

    let ctx = session.select_tournament(CHAMPIONS_LEAGUE).unwrap();
    assert_eq!(ctx.tournament.name, "Champions League");
    assert_eq!(ctx.round, RoundSelection::Round(3));
    assert_eq!(match_ids(&session), vec![106, 105]);

    let round_one = session.select_round(RoundSelection::Round(1)).unwrap();
    assert!(round_one.iter().all(|m| m.round == Some(1)));
    assert_eq!(round_one.len(), 2);

    session.back().unwrap();
    assert_eq!(session.screen(), &Screen::SportList);

    session.select_sport(FOOTBALL).unwrap();
    let ctx = session.select_tournament(CHAMPIONS_LEAGUE).unwrap();
    assert_eq!(ctx.round, RoundSelection::Round(3));
    assert_eq!(ctx.page(), 0);
}

#[test]
fn round_page_survives_round_selection() {
    let config = ViewConfig {
        round_page_size: 2,
        ..ViewConfig::default()
    };
    let mut session = Session::start(common::seeded(), config).unwrap();
    session.select_sport(FOOTBALL).unwrap();
    session.select_tournament(CHAMPIONS_LEAGUE).unwrap();

    assert_eq!(session.set_page(5).unwrap(), 1);
    assert_eq!(session.context().unwrap().pager().visible(), &[3]);

    session.select_round(RoundSelection::Round(2)).unwrap();
    assert_eq!(session.context().unwrap().page(), 1);
}

#[test]
fn switching_tournament_resets_selection() {
    let mut session = start();
    session.select_sport(FOOTBALL).unwrap();
    session.select_tournament(CHAMPIONS_LEAGUE).unwrap();
    session.select_round(RoundSelection::Round(1)).unwrap();

    let ctx = session.select_tournament(TournamentId(1)).unwrap();
    assert_eq!(ctx.round, RoundSelection::All);
    assert_eq!(match_ids(&session).len(), 6);
}

#[test]
fn match_view_round_trip_keeps_round() {
    let mut session = start();
    session.select_sport(FOOTBALL).unwrap();
    session.select_tournament(CHAMPIONS_LEAGUE).unwrap();
    session.select_round(RoundSelection::Round(3)).unwrap();

    let view = session.select_match(MatchId(105)).unwrap();
    let sizes = view.lineups.ready().unwrap().sizes();
    assert_eq!((sizes.team1_starters, sizes.team2_starters), (3, 2));

    session.back().unwrap();
    assert_eq!(
        session.context().unwrap().round,
        RoundSelection::Round(3)
    );
}

#[test]
fn catalog_expands_only_what_was_visited() {
    let mut session = start();
    session.select_sport(FOOTBALL).unwrap();

    let catalog = session.catalog();
    assert!(catalog.sport(FOOTBALL).unwrap().tournaments.is_loaded());
    assert_eq!(
        catalog.sport(SportId(2)).unwrap().tournaments,
        Children::NotLoaded
    );
}

#[test]
fn selecting_match_before_tournament_is_rejected() {
    let mut session = start();
    assert!(matches!(
        session.select_match(MatchId(101)),
        Err(SessionError::Navigation(_))
    ));
}

#[test]
fn standings_reachable_without_match_table() {
    let db = common::seeded_with("ALTER TABLE matches RENAME TO matches_old;");
    let mut session = Session::start(db, ViewConfig::default()).unwrap();
    session.select_sport(FOOTBALL).unwrap();

    let ctx = session.select_tournament(CHAMPIONS_LEAGUE).unwrap();
    assert_eq!(ctx.round, RoundSelection::All);
    assert_eq!(session.screen().name(), "tournament view");

    let standings = session.standings().unwrap();
    assert_eq!(standings.len(), 4);
    assert!(session.current_matches().is_err());
}
