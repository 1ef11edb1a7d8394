use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use tracing::{info, warn};

use crate::build_context::BuildContext;
use crate::error::DataError;
use crate::normalize::normalize_team;
use crate::util::*;

// Loads the three tables named in the build context, normalizes every team column and validates the joins
// the builders rely on. Nothing downstream re-checks team membership, so anything that gets past here is
// assumed consistent.
pub fn load_tables(ctx: &BuildContext) -> Result<Tables, DataError> {
    let match_rows: Vec<MatchRow> = read_csv_file(&ctx.input_path(&ctx.matches_file))?;
    let batting_rows: Vec<BattingRow> = read_csv_file(&ctx.input_path(&ctx.batting_file))?;
    let bowling_rows: Vec<BowlingRow> = read_csv_file(&ctx.input_path(&ctx.bowling_file))?;

    Tables::from_rows(match_rows, batting_rows, bowling_rows)
}

fn read_csv_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    let rows = read_csv(file, path)?;

    info!(file = %path.display(), rows = rows.len(), "loaded table");
    Ok(rows)
}

pub fn read_csv<T: DeserializeOwned, R: Read>(reader: R, path: &Path) -> Result<Vec<T>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DataError::Csv { path: path.to_path_buf(), source })
}

// Line numbers in errors count the header, so they match what an editor shows.
fn line_of(idx: usize) -> usize {
    idx + 2
}

fn required(value: Option<String>, table: &'static str, idx: usize, field: &'static str) -> Result<String, DataError> {
    value.ok_or(DataError::MissingField { table, line: line_of(idx), field })
}

fn required_team(raw: Option<&str>, table: &'static str, idx: usize, field: &'static str) -> Result<String, DataError> {
    let team = required(normalize_team(raw), table, idx, field)?;
    if team.contains(',') {
        return Err(DataError::AmbiguousTeamName(team));
    }
    Ok(team)
}

fn required_player(
    raw: Option<String>,
    table: &'static str,
    idx: usize,
    field: &'static str,
) -> Result<String, DataError> {
    let player = raw.map(|p| p.trim().to_owned()).filter(|p| !p.is_empty());
    required(player, table, idx, field)
}

fn required_round(raw: &str, table: &'static str, idx: usize) -> Result<String, DataError> {
    let round = raw.trim();
    if round.is_empty() {
        return Err(DataError::MissingField { table, line: line_of(idx), field: "Match Details" });
    }
    Ok(round.to_owned())
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub matches: Vec<MatchRecord>,
    pub batting: Vec<BattingEntry>,
    pub bowling: Vec<BowlingEntry>,
}

impl Tables {
    pub fn from_rows(
        match_rows: Vec<MatchRow>,
        batting_rows: Vec<BattingRow>,
        bowling_rows: Vec<BowlingRow>,
    ) -> Result<Self, DataError> {
        let mut matches = Vec::with_capacity(match_rows.len());
        let mut rounds = HashSet::new();

        for (idx, row) in match_rows.into_iter().enumerate() {
            let m = MatchRecord::new(row, idx)?;
            if !rounds.insert(m.round.clone()) {
                return Err(DataError::DuplicateRound(m.round));
            }
            matches.push(m);
        }

        let batting = batting_rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| BattingEntry::new(row, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let bowling = bowling_rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| BowlingEntry::new(row, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let tables = Self { matches, batting, bowling };
        tables.validate_sides()?;

        Ok(tables)
    }

    // Every batting and bowling row that points at a known match must name one of that match's two teams.
    fn validate_sides(&self) -> Result<(), DataError> {
        let by_round: HashMap<&str, &MatchRecord> = self.matches.iter().map(|m| (m.round.as_str(), m)).collect();

        let batting_sides = self.batting.iter().map(|b| ("batting", b.round.as_str(), b.team.as_str()));
        let bowling_sides = self.bowling.iter().map(|b| ("bowling", b.round.as_str(), b.team.as_str()));

        let mut orphans = 0;
        for (side, round, team) in batting_sides.chain(bowling_sides) {
            let Some(m) = by_round.get(round) else {
                orphans += 1;
                continue;
            };

            if !m.is_in_game(team) {
                return Err(DataError::ForeignTeam {
                    round: round.to_owned(),
                    side,
                    team: team.to_owned(),
                    team_1: m.team_1.clone(),
                    team_2: m.team_2.clone(),
                });
            }
        }

        if orphans > 0 {
            warn!(
                rows = orphans,
                "player rows reference a round label missing from the match table; they are left out of scorecards"
            );
        }

        Ok(())
    }

    /// Seasons present in the match table, latest first.
    pub fn seasons(&self) -> Vec<u16> {
        let seasons: BTreeSet<u16> = self.matches.iter().map(|m| m.season).collect();
        seasons.into_iter().rev().collect()
    }

    /// The canonical team list: every declared team, sorted and deduplicated.
    pub fn teams(&self) -> Vec<String> {
        let teams: BTreeSet<&str> = self
            .matches
            .iter()
            .flat_map(|m| [m.team_1.as_str(), m.team_2.as_str()])
            .collect();

        teams.into_iter().map(str::to_owned).collect()
    }
}

// Raw rows mirror the CSV headers. They get turned into the records below once team names are normalized
// and required cells are checked.
#[derive(Deserialize, Debug, Clone)]
pub struct MatchRow {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    #[serde(rename(deserialize = "IPL Edition"))]
    pub season: u16,
    #[serde(rename(deserialize = "Team 1"))]
    pub team_1: Option<String>,
    #[serde(rename(deserialize = "Team 2"))]
    pub team_2: Option<String>,
    #[serde(rename(deserialize = "Match Details"))]
    pub round: String,
    #[serde(rename(deserialize = "Date"))]
    pub date: String,
    #[serde(rename(deserialize = "Time"), default)]
    pub time: Option<String>,
    #[serde(rename(deserialize = "Winner"), default)]
    pub winner: Option<String>,
    #[serde(rename(deserialize = "Winning Details"), default)]
    pub winning_details: Option<String>,
}

// Serialized under the source column names, which is how the dashboard reads `match_info`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MatchRecord {
    #[serde(rename(serialize = "IPL Edition"))]
    pub season: u16,
    #[serde(rename(serialize = "Team 1"))]
    pub team_1: String,
    #[serde(rename(serialize = "Team 2"))]
    pub team_2: String,
    #[serde(rename(serialize = "Match Details"))]
    pub round: String,
    #[serde(rename(serialize = "Date"))]
    pub date: NaiveDate,
    #[serde(rename(serialize = "Time"))]
    pub time: Option<String>,
    #[serde(rename(serialize = "Winner"))]
    pub winner: Option<String>,
    #[serde(rename(serialize = "Winning Details"))]
    pub winning_details: Option<String>,
}

impl MatchRecord {
    pub fn new(row: MatchRow, idx: usize) -> Result<Self, DataError> {
        const TABLE: &str = "match";

        let round = required_round(&row.round, TABLE, idx)?;
        let team_1 = required_team(row.team_1.as_deref(), TABLE, idx, "Team 1")?;
        let team_2 = required_team(row.team_2.as_deref(), TABLE, idx, "Team 2")?;

        if team_1 == team_2 {
            return Err(DataError::SameTeams { round, team: team_1 });
        }

        let Some(date) = parse_match_date(&row.date) else {
            return Err(DataError::BadDate { round, raw: row.date });
        };

        Ok(Self {
            season: row.season,
            team_1,
            team_2,
            round,
            date,
            time: row.time.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty()),
            winner: normalize_team(row.winner.as_deref()),
            winning_details: row.winning_details.map(|d| d.trim().to_owned()).filter(|d| !d.is_empty()),
        })
    }

    pub fn is_in_game(&self, team: &str) -> bool {
        self.team_1 == team || self.team_2 == team
    }

    /// The opponent of `team`, or None when `team` didn't play this match.
    pub fn other_team(&self, team: &str) -> Option<&str> {
        if self.team_1 == team {
            Some(&self.team_2)
        } else if self.team_2 == team {
            Some(&self.team_1)
        } else {
            None
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct BattingRow {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    #[serde(rename(deserialize = "IPL Edition"))]
    pub season: u16,
    #[serde(rename(deserialize = "Match Details"))]
    pub round: String,
    #[serde(rename(deserialize = "Team Batting"))]
    pub team: Option<String>,
    #[serde(rename(deserialize = "Batsman Names"))]
    pub player: Option<String>,
    #[serde(deserialize_with = "deserialize_stat")]
    #[serde(rename(deserialize = "Runs Scored"))]
    pub runs: u32,
    #[serde(deserialize_with = "deserialize_optional_stat", rename(deserialize = "Balls Played"), default)]
    pub balls: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_stat", rename(deserialize = "4s"), default)]
    pub fours: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_stat", rename(deserialize = "6s"), default)]
    pub sixes: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_decimal", rename(deserialize = "Strike Rate"), default)]
    pub strike_rate: Option<f64>,
    #[serde(rename(deserialize = "Dismissal"), default)]
    pub dismissal: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BattingEntry {
    pub season: u16,
    pub round: String,
    pub team: String,
    pub player: String,
    pub runs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sixes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<String>,
}

impl BattingEntry {
    pub fn new(row: BattingRow, idx: usize) -> Result<Self, DataError> {
        const TABLE: &str = "batting";

        Ok(Self {
            season: row.season,
            round: required_round(&row.round, TABLE, idx)?,
            team: required_team(row.team.as_deref(), TABLE, idx, "Team Batting")?,
            player: required_player(row.player, TABLE, idx, "Batsman Names")?,
            runs: row.runs,
            balls: row.balls,
            fours: row.fours,
            sixes: row.sixes,
            strike_rate: row.strike_rate,
            dismissal: row.dismissal,
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct BowlingRow {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    #[serde(rename(deserialize = "IPL Edition"))]
    pub season: u16,
    #[serde(rename(deserialize = "Match Details"))]
    pub round: String,
    #[serde(rename(deserialize = "Team Bowling"))]
    pub team: Option<String>,
    #[serde(rename(deserialize = "Bowler Name"))]
    pub player: Option<String>,
    #[serde(deserialize_with = "deserialize_stat")]
    #[serde(rename(deserialize = "Wickets"))]
    pub wickets: u32,
    #[serde(deserialize_with = "deserialize_optional_decimal", rename(deserialize = "Overs Bowled"), default)]
    pub overs: Option<f64>,
    #[serde(deserialize_with = "deserialize_optional_stat", rename(deserialize = "Maidens"), default)]
    pub maidens: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_stat", rename(deserialize = "Runs Conceded"), default)]
    pub runs_conceded: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_decimal", rename(deserialize = "Economy"), default)]
    pub economy: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BowlingEntry {
    pub season: u16,
    pub round: String,
    pub team: String,
    pub player: String,
    pub wickets: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maidens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs_conceded: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economy: Option<f64>,
}

impl BowlingEntry {
    pub fn new(row: BowlingRow, idx: usize) -> Result<Self, DataError> {
        const TABLE: &str = "bowling";

        Ok(Self {
            season: row.season,
            round: required_round(&row.round, TABLE, idx)?,
            team: required_team(row.team.as_deref(), TABLE, idx, "Team Bowling")?,
            player: required_player(row.player, TABLE, idx, "Bowler Name")?,
            wickets: row.wickets,
            overs: row.overs,
            maidens: row.maidens,
            runs_conceded: row.runs_conceded,
            economy: row.economy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{tables_from_csv, BATTING_HEADER, BOWLING_HEADER, MATCH_HEADER};

    fn matches_csv(rows: &[&str]) -> String {
        std::iter::once(MATCH_HEADER).chain(rows.iter().copied()).collect::<Vec<_>>().join("\n")
    }

    fn load_matches(row: &str) -> Result<Tables, DataError> {
        tables_from_csv(&matches_csv(&[row]), BATTING_HEADER, BOWLING_HEADER)
    }

    #[test]
    fn loads_and_normalizes_every_team_column() {
        let tables = tables_from_csv(
            &matches_csv(&[
                "2023,Kings XI Punjab,Delhi Daredevils,1st Match,2023-04-01,Delhi Daredevils,won by 5 runs",
            ]),
            &format!("{BATTING_HEADER}\n2023,1st Match, kings xi punjab ,Shikhar Dhawan,40\n"),
            &format!("{BOWLING_HEADER}\n2023,1st Match,DELHI DAREDEVILS,Axar Patel,2\n"),
        )
        .unwrap();

        let m = &tables.matches[0];
        assert_eq!(m.team_1, "PUNJAB KINGS");
        assert_eq!(m.team_2, "DELHI CAPITALS");
        assert_eq!(m.winner.as_deref(), Some("DELHI CAPITALS"));
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(tables.batting[0].team, "PUNJAB KINGS");
        assert_eq!(tables.bowling[0].team, "DELHI CAPITALS");
    }

    #[test]
    fn blank_winner_is_a_missing_value() {
        let tables = tables_from_csv(
            &matches_csv(&["2019,Mumbai Indians,Chennai Super Kings,Match 5,2019-04-03,,No result"]),
            BATTING_HEADER,
            BOWLING_HEADER,
        )
        .unwrap();

        assert_eq!(tables.matches[0].winner, None);
        assert_eq!(tables.matches[0].winning_details.as_deref(), Some("No result"));
    }

    #[test]
    fn dashes_and_blanks_in_stat_columns() {
        let tables = tables_from_csv(
            &matches_csv(&["2020,A,B,Match 1,2020-09-19,A,won"]),
            "IPL Edition,Match Details,Team Batting,Batsman Names,Runs Scored,Balls Played,4s\n\
             2020,Match 1,A,Opener,-,,2\n",
            BOWLING_HEADER,
        )
        .unwrap();

        let entry = &tables.batting[0];
        assert_eq!(entry.runs, 0);
        assert_eq!(entry.balls, None);
        assert_eq!(entry.fours, Some(2));
        assert_eq!(entry.sixes, None);
    }

    #[test]
    fn duplicate_round_label_is_rejected() {
        let err = tables_from_csv(
            &matches_csv(&[
                "2021,A,B,Final,2021-10-15,A,won",
                "2021,C,D,Final,2021-10-16,C,won",
            ]),
            BATTING_HEADER,
            BOWLING_HEADER,
        )
        .unwrap_err();

        assert!(matches!(err, DataError::DuplicateRound(ref r) if r == "Final"));
    }

    #[test]
    fn batting_team_outside_the_match_is_rejected() {
        let err = tables_from_csv(
            &matches_csv(&["2022,A,B,Match 3,2022-03-30,A,won"]),
            &format!("{BATTING_HEADER}\n2022,Match 3,C,Stray,10\n"),
            BOWLING_HEADER,
        )
        .unwrap_err();

        match err {
            DataError::ForeignTeam { side, team, .. } => {
                assert_eq!(side, "batting");
                assert_eq!(team, "C");
            }
            other => panic!("expected ForeignTeam, got {other:?}"),
        }
    }

    #[test]
    fn bowling_team_outside_the_match_is_rejected() {
        let err = tables_from_csv(
            &matches_csv(&["2022,A,B,Match 3,2022-03-30,A,won"]),
            BATTING_HEADER,
            &format!("{BOWLING_HEADER}\n2022,Match 3,Z,Stray,1\n"),
        )
        .unwrap_err();

        assert!(matches!(err, DataError::ForeignTeam { side: "bowling", .. }));
    }

    #[test]
    fn aliases_of_the_same_team_cannot_play_each_other() {
        let err = tables_from_csv(
            &matches_csv(&["2018,Delhi Daredevils,Delhi Capitals,Match 9,2018-04-14,,"]),
            BATTING_HEADER,
            BOWLING_HEADER,
        )
        .unwrap_err();

        assert!(matches!(err, DataError::SameTeams { ref team, .. } if team == "DELHI CAPITALS"));
    }

    #[test]
    fn missing_team_and_bad_date_are_reported() {
        let missing = load_matches("2018,,B,Match 9,2018-04-14,,").unwrap_err();
        assert!(matches!(missing, DataError::MissingField { table: "match", line: 2, field: "Team 1" }));

        let bad_date = load_matches("2018,A,B,Match 9,someday,,").unwrap_err();
        assert!(matches!(bad_date, DataError::BadDate { ref raw, .. } if raw == "someday"));
    }

    #[test]
    fn comma_in_team_name_is_rejected() {
        let err = load_matches("2018,\"A, B\",C,Match 9,2018-04-14,,").unwrap_err();
        assert!(matches!(err, DataError::AmbiguousTeamName(ref t) if t == "A, B"));
    }

    #[test]
    fn orphan_player_rows_are_tolerated() {
        let tables = tables_from_csv(
            &matches_csv(&["2022,A,B,Match 3,2022-03-30,A,won"]),
            &format!("{BATTING_HEADER}\n2022,Match 99,C,Somebody,10\n"),
            BOWLING_HEADER,
        )
        .unwrap();

        assert_eq!(tables.batting.len(), 1);
    }

    #[test]
    fn seasons_latest_first_and_sorted_team_list() {
        let tables = tables_from_csv(
            &matches_csv(&[
                "2019,Rajasthan Royals,Mumbai Indians,Match 1,2019-03-23,,",
                "2023,Chennai Super Kings,Mumbai Indians,Match 1b,2023-03-31,,",
                "2019,Kings XI Punjab,Rajasthan Royals,Match 2,2019-03-24,,",
            ]),
            BATTING_HEADER,
            BOWLING_HEADER,
        )
        .unwrap();

        assert_eq!(tables.seasons(), vec![2023, 2019]);
        assert_eq!(
            tables.teams(),
            vec!["CHENNAI SUPER KINGS", "MUMBAI INDIANS", "PUNJAB KINGS", "RAJASTHAN ROYALS"]
        );
    }

    #[test]
    fn other_team_is_the_opponent() {
        let tables = load_matches("2022,A,B,Match 3,2022-03-30,A,won").unwrap();
        let m = &tables.matches[0];

        assert_eq!(m.other_team("A"), Some("B"));
        assert_eq!(m.other_team("B"), Some("A"));
        assert_eq!(m.other_team("C"), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_csv_file::<MatchRow>(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
