use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DataError;

pub const WINNER_NOT_AVAILABLE: &str = "Data Not Available";

// Everything a run needs to know up front. Built once in main and only read afterwards.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub data_dir: PathBuf,
    pub matches_file: PathBuf,
    pub batting_file: PathBuf,
    pub bowling_file: PathBuf,
    pub out_dir: PathBuf,

    pub leaderboard_size: usize,
    pub recent_encounters: usize,

    pub season_winners: SeasonWinners,
    pub print_report: bool,
    pub compare: Option<(String, String)>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            matches_file: PathBuf::from("match_summary.csv"),
            batting_file: PathBuf::from("batting_summary.csv"),
            bowling_file: PathBuf::from("bowling_summary.csv"),
            out_dir: PathBuf::from("."),

            leaderboard_size: 10,
            recent_encounters: 5,

            season_winners: SeasonWinners::builtin(),
            print_report: true,
            compare: None,
        }
    }
}

impl BuildContext {
    // Absolute file names are kept as given, since `join` replaces the base.
    pub fn input_path(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }
}

/// Champion of each edition. Seasons without an entry report `WINNER_NOT_AVAILABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonWinners(BTreeMap<u16, String>);

impl SeasonWinners {
    pub fn builtin() -> Self {
        let table = [
            (2008, "Rajasthan Royals"),
            (2009, "Deccan Chargers"),
            (2010, "Chennai Super Kings"),
            (2011, "Chennai Super Kings"),
            (2012, "Kolkata Knight Riders"),
            (2013, "Mumbai Indians"),
            (2014, "Kolkata Knight Riders"),
            (2015, "Mumbai Indians"),
            (2016, "Sunrisers Hyderabad"),
            (2017, "Mumbai Indians"),
            (2018, "Chennai Super Kings"),
            (2019, "Mumbai Indians"),
            (2020, "Mumbai Indians"),
            (2021, "Chennai Super Kings"),
            (2022, "Gujarat Titans"),
            (2023, "Chennai Super Kings"),
        ];

        Self(table.into_iter().map(|(season, team)| (season, team.to_owned())).collect())
    }

    /// Reads a JSON object of `"season": "winner"` pairs. It replaces the built-in table rather than extending it.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let raw = fs::read_to_string(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;

        Self::from_json(&raw).map_err(|source| DataError::SeasonWinners { path: path.to_path_buf(), source })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    pub fn get(&self, season: u16) -> Option<&str> {
        self.0.get(&season).map(String::as_str)
    }

    pub fn winner_or_placeholder(&self, season: u16) -> &str {
        self.get(season).unwrap_or(WINNER_NOT_AVAILABLE)
    }
}
