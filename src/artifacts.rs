use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::build_context::BuildContext;
use crate::data_loader::Tables;
use crate::error::DataError;
use crate::head_to_head::{build_head_to_head, HeadToHead};
use crate::leaderboard::{build_leaderboards, SeasonLeaderboard};
use crate::scorecard::{build_scorecards, Scorecard};
use crate::season::{build_dashboard_matches, build_season_summaries, DashboardMatch, SeasonSummary};
use crate::util::OrderedMap;

pub const SCORECARD_FILE: &str = "scorecard_data.json";
pub const LEADERBOARD_FILE: &str = "leaderboards.json";
pub const HEAD_TO_HEAD_FILE: &str = "h2h_data.json";
pub const TEAMS_FILE: &str = "teams.json";
pub const DASHBOARD_FILE: &str = "dashboard_matches.json";
pub const SEASON_SUMMARY_FILE: &str = "season_summaries.json";

#[derive(Debug)]
pub struct Artifacts<'a> {
    pub scorecards: OrderedMap<String, Scorecard<'a>>,
    pub leaderboards: OrderedMap<u16, SeasonLeaderboard>,
    pub head_to_head: OrderedMap<String, HeadToHead>,
    pub teams: Vec<String>,
    pub dashboard: OrderedMap<String, DashboardMatch<'a>>,
    pub seasons: OrderedMap<u16, SeasonSummary<'a>>,
}

impl<'a> Artifacts<'a> {
    pub fn build(tables: &'a Tables, ctx: &'a BuildContext) -> Result<Self, DataError> {
        let teams = tables.teams();
        let seasons = tables.seasons();

        Ok(Self {
            scorecards: build_scorecards(tables)?,
            leaderboards: build_leaderboards(tables, ctx.leaderboard_size),
            head_to_head: build_head_to_head(&tables.matches, &teams, ctx.recent_encounters),
            dashboard: build_dashboard_matches(&tables.matches),
            seasons: build_season_summaries(&tables.matches, &ctx.season_winners, &seasons),
            teams,
        })
    }

    // Serialized up front, so a serialization failure can't leave some files written and others not.
    fn render(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (SCORECARD_FILE, to_json(&self.scorecards)?),
            (LEADERBOARD_FILE, to_json(&self.leaderboards)?),
            (HEAD_TO_HEAD_FILE, to_json(&self.head_to_head)?),
            (TEAMS_FILE, to_json(&self.teams)?),
            (DASHBOARD_FILE, to_json(&self.dashboard)?),
            (SEASON_SUMMARY_FILE, to_json(&self.seasons)?),
        ])
    }

    pub fn write_all(&self, out_dir: &Path) -> Result<()> {
        let rendered = self.render()?;

        fs::create_dir_all(out_dir).with_context(|| format!("create output directory {}", out_dir.display()))?;
        for (name, json) in rendered {
            let path = out_dir.join(name);
            write_atomic(&path, &json)?;
            info!(file = %path.display(), bytes = json.len(), "wrote artifact");
        }

        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serialize artifact")
}

// Write next to the target and rename over it, so readers never see a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {} into place", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{tables_from_csv, BATTING_HEADER, BOWLING_HEADER, MATCH_HEADER};

    #[test]
    fn writes_every_artifact_without_leftovers() {
        let tables = tables_from_csv(
            &format!("{MATCH_HEADER}\n2023,A,B,Match 1,2023-04-01,A,won\n"),
            &format!("{BATTING_HEADER}\n2023,Match 1,A,Opener,31\n"),
            &format!("{BOWLING_HEADER}\n2023,Match 1,B,Seamer,1\n"),
        )
        .unwrap();
        let ctx = BuildContext::default();
        let artifacts = Artifacts::build(&tables, &ctx).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        artifacts.write_all(&out).unwrap();

        let files =
            [SCORECARD_FILE, LEADERBOARD_FILE, HEAD_TO_HEAD_FILE, TEAMS_FILE, DASHBOARD_FILE, SEASON_SUMMARY_FILE];
        for name in files {
            let raw = fs::read_to_string(out.join(name)).unwrap();
            assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok(), "{name} is not valid json");
        }

        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.json");
        fs::write(&path, "stale").unwrap();

        write_atomic(&path, "[\"A\"]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[\"A\"]");
        assert!(!dir.path().join("teams.json.tmp").exists());
    }
}
