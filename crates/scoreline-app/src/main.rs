// Scoreline entry point.
//
// Startup sequence:
// 1. Parse command line
// 2. Load config
// 3. Initialize tracing (log to file, not terminal)
// 4. Open the sports store read-only, report missing tables
// 5. Dispatch the command through a session and print the result

mod cli;
mod render;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{error, info, warn};

use scoreline_core::config::{self, Config};
use scoreline_core::form::{head_to_head, recent_form};
use scoreline_core::lookup::{match_by_id, resolve_team, team_by_id, tournament_by_id};
use scoreline_core::model::{MatchId, SportId, Team, TeamId, TournamentId};
use scoreline_core::rounds::RoundSelection;
use scoreline_core::session::Session;
use scoreline_core::{Database, Error};

use cli::{Cli, Command, OutputFormat};

fn main() -> anyhow::Result<()> {
    // 1. Parse command line
    let cli = Cli::parse();

    // 2. Load config
    let mut config =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }

    // 3. Initialize tracing
    init_tracing(&config.logging.filter)?;
    info!("scoreline starting: {:?}", cli.command);

    // 4. Open the store
    let db_path = config.database.resolved_path();
    let db = Database::open(&db_path, config.database.busy_timeout())
        .with_context(|| format!("failed to open sports database at {db_path}"))?;
    info!("Database opened at {}", db.location());
    let missing = db.missing_tables().context("failed to inspect database schema")?;
    if !missing.is_empty() {
        eprintln!(
            "warning: database is missing tables ({}); some views will be empty",
            missing.join(", ")
        );
    }

    // 5. Dispatch
    let output = run(cli.command, db, &config).inspect_err(|e| error!("command failed: {e:#}"))?;
    print!("{output}");
    Ok(())
}

fn run(command: Command, db: Database, config: &Config) -> anyhow::Result<String> {
    match command {
        Command::Sports { expand } => {
            let mut session = Session::start(db, config.view)?;
            if let Some(sport) = expand {
                session.select_sport(SportId(sport))?;
            }
            Ok(render::sports_tree(session.catalog()))
        }

        Command::Matches {
            tournament,
            round,
            all,
            page,
            format,
        } => {
            let mut session = Session::start(db, config.view)?;
            open_tournament(&mut session, TournamentId(tournament))?;
            let matches = match (all, round) {
                (true, _) => session.select_round(RoundSelection::All)?,
                (false, Some(n)) => session.select_round(RoundSelection::Round(n))?,
                (false, None) => session.current_matches()?,
            };
            session.set_page(page)?;

            match format {
                OutputFormat::Table => {
                    let context = session
                        .context()
                        .context("tournament view was not opened")?;
                    Ok(render::match_list(context, &matches))
                }
                OutputFormat::Json => render::to_json(&matches),
                OutputFormat::Csv => render::matches_csv(&matches),
            }
        }

        Command::Standings { tournament, format } => {
            let mut session = Session::start(db, config.view)?;
            open_tournament(&mut session, TournamentId(tournament))?;
            let rows = session.standings()?;
            let rules = &config.standings;
            match format {
                OutputFormat::Table => Ok(render::standings_table(&rows, rules)),
                OutputFormat::Json => {
                    let records: Vec<_> = render::standing_records(&rows, rules).collect();
                    render::to_json(&records)
                }
                OutputFormat::Csv => render::standings_csv(&rows, rules),
            }
        }

        Command::Match { id, format } => {
            let id = MatchId(id);
            let summary = match_by_id(&db, id)?;
            let mut session = Session::start(db, config.view)?;
            open_tournament(&mut session, summary.tournament_id)?;
            let view = session.select_match(id)?;
            for section in view.failed_sections() {
                warn!("match {id}: {section} could not be loaded");
            }
            match format {
                OutputFormat::Table => Ok(render::match_view(&view)),
                OutputFormat::Json => render::to_json(&view),
                OutputFormat::Csv => bail!("the match view has no CSV form; use table or json"),
            }
        }

        Command::Form {
            team,
            before,
            limit,
        } => {
            let team = team_arg(&db, &team)?;
            let limit = limit.unwrap_or(config.view.form_limit);
            let matches = recent_form(&db, team.id, before.unwrap_or_else(today), limit)?;
            Ok(render::form_list(&team, &matches))
        }

        Command::H2h {
            team_a,
            team_b,
            before,
            limit,
        } => {
            let a = team_arg(&db, &team_a)?;
            let b = team_arg(&db, &team_b)?;
            let limit = limit.unwrap_or(config.view.head_to_head_limit);
            let matches = head_to_head(&db, a.id, b.id, before.unwrap_or_else(today), limit)?;
            Ok(render::head_to_head_list(&a, &b, &matches))
        }

        Command::Team { name } => match resolve_team(&db, &name) {
            Ok(id) => Ok(format!("{} #{}\n", team_by_id(&db, id)?.name, id)),
            Err(Error::AmbiguousReference { candidates, .. }) => {
                let ids: Vec<String> = candidates.iter().map(|id| format!("#{id}")).collect();
                bail!("`{name}` matches several teams: {}", ids.join(", "))
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Walk the session from the sport list into `tournament`.
fn open_tournament(session: &mut Session<Database>, tournament: TournamentId) -> anyhow::Result<()> {
    let sport = tournament_by_id(session.store(), tournament)?.sport_id;
    session.select_sport(sport)?;
    session.select_tournament(tournament)?;
    Ok(())
}

/// A team given on the command line as an id or an exact name.
fn team_arg(db: &Database, arg: &str) -> anyhow::Result<Team> {
    let id = match arg.trim().parse::<i64>() {
        Ok(id) => TeamId(id),
        Err(_) => resolve_team(db, arg).with_context(|| format!("cannot resolve team `{arg}`"))?,
    };
    Ok(team_by_id(db, id)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Initialize tracing to log to a file so command output stays clean.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("scoreline.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
