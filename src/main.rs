mod artifacts;
mod build_context;
mod data_loader;
mod error;
mod head_to_head;
mod leaderboard;
mod match_order;
mod normalize;
mod report;
mod scorecard;
mod season;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artifacts::*;
use build_context::*;
use data_loader::*;
use normalize::normalize_team_name;
use report::*;

/*
    Reads the three IPL summary tables (matches, batting, bowling) and writes the JSON files the dashboard
    loads: scorecards, leaderboards, head-to-head records, the team list, label-keyed matches and season
    summaries. Every artifact is computed before the first one is written.
*/

#[derive(Parser, Debug)]
#[command(name = "ipl_digest")]
#[command(about = "Build dashboard JSON artifacts from IPL match, batting and bowling summaries")]
struct Args {
    /// Directory holding the input CSV files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[arg(long, default_value = "match_summary.csv")]
    matches: PathBuf,

    #[arg(long, default_value = "batting_summary.csv")]
    batting: PathBuf,

    #[arg(long, default_value = "bowling_summary.csv")]
    bowling: PathBuf,

    /// Where the JSON artifacts go
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Leaderboard entries per season and category
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Encounters kept per head-to-head record
    #[arg(long, default_value_t = 5)]
    recent: usize,

    /// JSON object of season -> champion, replacing the built-in table
    #[arg(long)]
    season_winners: Option<PathBuf>,

    /// Print the head-to-head record of two teams, any spelling
    #[arg(long, num_args = 2, value_names = ["TEAM", "TEAM"])]
    h2h: Vec<String>,

    #[arg(long)]
    no_report: bool,
}

impl Args {
    fn into_context(self) -> Result<BuildContext> {
        let season_winners = match &self.season_winners {
            Some(path) => SeasonWinners::load(path)?,
            None => SeasonWinners::builtin(),
        };

        Ok(BuildContext {
            data_dir: self.data_dir,
            matches_file: self.matches,
            batting_file: self.batting,
            bowling_file: self.bowling,
            out_dir: self.out_dir,
            leaderboard_size: self.top,
            recent_encounters: self.recent,
            season_winners,
            print_report: !self.no_report,
            compare: match self.h2h.as_slice() {
                [a, b] => Some((normalize_team_name(a), normalize_team_name(b))),
                _ => None,
            },
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipl_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = Args::parse().into_context()?;
    run(&ctx)
}

fn run(ctx: &BuildContext) -> Result<()> {
    let tables = load_tables(ctx)?;
    info!(
        matches = tables.matches.len(),
        batting = tables.batting.len(),
        bowling = tables.bowling.len(),
        "tables validated"
    );

    let artifacts = Artifacts::build(&tables, ctx)?;
    artifacts
        .write_all(&ctx.out_dir)
        .with_context(|| format!("writing artifacts to {}", ctx.out_dir.display()))?;

    if ctx.print_report {
        output_report(&artifacts);
    }
    if let Some((team_1, team_2)) = &ctx.compare {
        output_head_to_head(&artifacts, team_1, team_2);
    }

    Ok(())
}
