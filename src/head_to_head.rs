use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data_loader::*;
use crate::util::OrderedMap;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Encounter {
    pub date: NaiveDate,
    pub winner: Option<String>,
    pub winning_details: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HeadToHead {
    pub total_matches: usize,
    pub team1_wins: usize,
    pub team2_wins: usize,
    #[serde(rename = "last_5_encounters")]
    pub recent_encounters: Vec<Encounter>,
}

impl HeadToHead {
    /// The same record seen from the other side of the pair.
    pub fn swapped(&self) -> Self {
        Self {
            team1_wins: self.team2_wins,
            team2_wins: self.team1_wins,
            ..self.clone()
        }
    }
}

pub fn pair_key(team_1: &str, team_2: &str) -> String {
    format!("{team_1} vs {team_2}")
}

// Pairs come from `teams` (expected sorted and deduplicated), never from match order, so "A vs B" is the only
// key a pair can have. Pairs that never met are left out. A result naming neither side (no result, abandoned)
// still counts as a match played.
pub fn build_head_to_head(matches: &[MatchRecord], teams: &[String], recent: usize) -> OrderedMap<String, HeadToHead> {
    let mut by_pair: HashMap<(&str, &str), Vec<&MatchRecord>> = HashMap::new();
    for m in matches {
        by_pair.entry(unordered(&m.team_1, &m.team_2)).or_default().push(m);
    }

    let mut records = OrderedMap::new();

    for (i, team_1) in teams.iter().enumerate() {
        for team_2 in &teams[i + 1..] {
            let Some(meetings) = by_pair.get(&unordered(team_1, team_2)) else {
                continue;
            };

            let wins_for = |team: &str| meetings.iter().filter(|m| m.winner.as_deref() == Some(team)).count();

            let mut latest = meetings.clone();
            latest.sort_by(|a, b| b.date.cmp(&a.date));

            let recent_encounters = latest
                .into_iter()
                .take(recent)
                .map(|m| Encounter {
                    date: m.date,
                    winner: m.winner.clone(),
                    winning_details: m.winning_details.clone(),
                })
                .collect();

            records.push(pair_key(team_1, team_2), HeadToHead {
                total_matches: meetings.len(),
                team1_wins: wins_for(team_1.as_str()),
                team2_wins: wins_for(team_2.as_str()),
                recent_encounters,
            });
        }
    }

    records
}

/// Finds the record for a pair given in either order, oriented so `team1_wins` belongs to `team_1`.
pub fn lookup(records: &OrderedMap<String, HeadToHead>, team_1: &str, team_2: &str) -> Option<HeadToHead> {
    records
        .get(pair_key(team_1, team_2).as_str())
        .cloned()
        .or_else(|| records.get(pair_key(team_2, team_1).as_str()).map(HeadToHead::swapped))
}

fn unordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
