use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::data_loader::*;
use crate::error::DataError;
use crate::util::OrderedMap;

#[derive(Serialize, Debug)]
pub struct Scorecard<'a> {
    pub match_info: &'a MatchRecord,
    pub innings: OrderedMap<String, Innings<'a>>,
}

#[derive(Serialize, Debug)]
pub struct Innings<'a> {
    pub batting_team: &'a str,
    pub batting_card: Vec<&'a BattingEntry>,
    pub bowling_team: &'a str,
    pub bowling_card: Vec<&'a BowlingEntry>,
}

// One scorecard per match, keyed by round label in match table order.
// Innings order is the order in which batting teams first show up in the batting table. A match nobody batted
// in (washed out) gets an empty innings map.
pub fn build_scorecards(tables: &Tables) -> Result<OrderedMap<String, Scorecard<'_>>, DataError> {
    let batting_by_round = group_by_round(&tables.batting, |b| b.round.as_str());
    let bowling_by_round = group_by_round(&tables.bowling, |b| b.round.as_str());

    let mut seen = HashSet::new();
    let mut scorecards = OrderedMap::new();

    for m in &tables.matches {
        if !seen.insert(m.round.as_str()) {
            return Err(DataError::DuplicateRound(m.round.clone()));
        }

        let batting = batting_by_round.get(m.round.as_str()).map(Vec::as_slice).unwrap_or_default();
        let bowling = bowling_by_round.get(m.round.as_str()).map(Vec::as_slice).unwrap_or_default();

        let mut innings_order: Vec<&str> = Vec::new();
        for b in batting {
            if !innings_order.contains(&b.team.as_str()) {
                innings_order.push(&b.team);
            }
        }

        if innings_order.is_empty() {
            debug!(round = %m.round, "no batting rows, scorecard has no innings");
        }

        let mut innings = OrderedMap::new();
        for (i, batting_team) in innings_order.into_iter().enumerate() {
            let Some(bowling_team) = m.other_team(batting_team) else {
                return Err(DataError::ForeignTeam {
                    round: m.round.clone(),
                    side: "batting",
                    team: batting_team.to_owned(),
                    team_1: m.team_1.clone(),
                    team_2: m.team_2.clone(),
                });
            };

            innings.push(format!("inning_{}", i + 1), Innings {
                batting_team,
                batting_card: batting.iter().copied().filter(|b| b.team == batting_team).collect(),
                bowling_team,
                bowling_card: bowling.iter().copied().filter(|b| b.team == bowling_team).collect(),
            });
        }

        scorecards.push(m.round.clone(), Scorecard { match_info: m, innings });
    }

    Ok(scorecards)
}

fn group_by_round<'a, T, F>(rows: &'a [T], round: F) -> HashMap<&'a str, Vec<&'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut groups: HashMap<&str, Vec<&T>> = HashMap::new();
    for row in rows {
        groups.entry(round(row)).or_default().push(row);
    }
    groups
}
