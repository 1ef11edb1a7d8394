use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{table} table, line {line}: missing value for '{field}'")]
    MissingField {
        table: &'static str,
        line: usize,
        field: &'static str,
    },

    #[error("match '{round}': unparsable date '{raw}'")]
    BadDate { round: String, raw: String },

    #[error("round label '{0}' appears more than once in the match table")]
    DuplicateRound(String),

    #[error("match '{round}': both declared teams are {team}")]
    SameTeams { round: String, team: String },

    #[error("team name '{0}' contains a comma and cannot be used in a match label")]
    AmbiguousTeamName(String),

    #[error("match '{round}': {side} team {team} is neither {team_1} nor {team_2}")]
    ForeignTeam {
        round: String,
        side: &'static str,
        team: String,
        team_1: String,
        team_2: String,
    },

    #[error("invalid season winner table {path}: {source}")]
    SeasonWinners {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
