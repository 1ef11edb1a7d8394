use std::collections::HashMap;

use serde::Serialize;

use crate::data_loader::*;
use crate::util::OrderedMap;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BatsmanStanding {
    pub player: String,
    pub runs: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BowlerStanding {
    pub player: String,
    pub wickets: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SeasonLeaderboard {
    pub top_batsmen: Vec<BatsmanStanding>,
    pub top_bowlers: Vec<BowlerStanding>,
}

/// Per season (latest first), the `limit` best run scorers and wicket takers.
pub fn build_leaderboards(tables: &Tables, limit: usize) -> OrderedMap<u16, SeasonLeaderboard> {
    let mut leaderboards = OrderedMap::new();

    for season in tables.seasons() {
        let batting = tables.batting.iter().filter(|b| b.season == season);
        let bowling = tables.bowling.iter().filter(|b| b.season == season);

        let top_batsmen = top_by(batting, |b| b.player.as_str(), |b| b.runs, limit)
            .into_iter()
            .map(|(player, runs)| BatsmanStanding { player: player.to_owned(), runs })
            .collect();

        let top_bowlers = top_by(bowling, |b| b.player.as_str(), |b| b.wickets, limit)
            .into_iter()
            .map(|(player, wickets)| BowlerStanding { player: player.to_owned(), wickets })
            .collect();

        leaderboards.push(season, SeasonLeaderboard { top_batsmen, top_bowlers });
    }

    leaderboards
}

// Sums `stat` per player and keeps the best `limit`. Players are kept in first-seen order before the stable
// sort, which is what breaks ties.
fn top_by<'a, T, P, S>(rows: impl Iterator<Item = &'a T>, player: P, stat: S, limit: usize) -> Vec<(&'a str, u32)>
where
    T: 'a,
    P: Fn(&'a T) -> &'a str,
    S: Fn(&T) -> u32,
{
    let mut totals: Vec<(&str, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let name = player(row);
        match index.get(name) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(stat(row)),
            None => {
                index.insert(name, totals.len());
                totals.push((name, stat(row)));
            }
        }
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(limit);
    totals
}
