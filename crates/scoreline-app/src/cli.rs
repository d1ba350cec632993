// Command-line surface of the viewer.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "scoreline")]
#[command(about = "Browse sports results, standings and match details", long_about = None)]
pub struct Cli {
    /// Config file (default: ./config/scoreline.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sports database, overriding `database.path` from the config
    #[arg(long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sports, optionally expanding one into its tournaments
    Sports {
        /// Sport id to expand
        #[arg(long)]
        expand: Option<i64>,
    },
    /// Show a tournament's round selector and matches
    Matches {
        tournament: i64,
        /// Round to show (default: the most recent round)
        #[arg(long, conflicts_with = "all")]
        round: Option<u32>,
        /// Show every match regardless of round
        #[arg(long)]
        all: bool,
        /// Page of the round selector
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show a tournament's standings table
    Standings {
        tournament: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show one match with statistics, timeline, lineups, form and head-to-head
    Match {
        id: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// A team's recent form
    Form {
        /// Team id or exact name
        team: String,
        /// Only matches strictly before this date (YYYY-MM-DD); default today
        #[arg(long)]
        before: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Head-to-head history of two teams
    H2h {
        /// Team id or exact name
        team_a: String,
        /// Team id or exact name
        team_b: String,
        #[arg(long)]
        before: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Resolve a team name to its id
    Team { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}
