use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::build_context::SeasonWinners;
use crate::data_loader::*;
use crate::match_order::{match_sort_key, sort_by_round};
use crate::util::OrderedMap;

/// Human-readable key the dashboard uses for a match, e.g. `"MUMBAI INDIANS vs CHENNAI SUPER KINGS, Final"`.
pub fn match_label(m: &MatchRecord) -> String {
    format!("{} vs {}, {}", m.team_1, m.team_2, m.round)
}

/// Recovers the two teams from a match label. Anything after the first comma on either side is context, not
/// part of the team name.
pub fn parse_match_label(label: &str) -> Option<(String, String)> {
    let (left, right) = label.split_once(" vs ")?;
    Some((clean_team_name(left), clean_team_name(right)))
}

fn clean_team_name(raw: &str) -> String {
    raw.split_once(',').map_or(raw, |(team, _)| team).trim().to_owned()
}

#[derive(Serialize, Debug)]
pub struct DashboardMatch<'a> {
    pub match_info: &'a MatchRecord,
}

pub fn build_dashboard_matches(matches: &[MatchRecord]) -> OrderedMap<String, DashboardMatch<'_>> {
    let mut dashboard = OrderedMap::new();
    for m in matches {
        dashboard.push(match_label(m), DashboardMatch { match_info: m });
    }
    dashboard
}

#[derive(Serialize, Debug)]
pub struct SeasonMatch<'a> {
    pub round: &'a str,
    pub sort_key: u32,
    pub label: String,
    pub date: NaiveDate,
    pub time: Option<&'a str>,
    pub winner: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct SeasonSummary<'a> {
    pub matches_played: usize,
    pub teams: usize,
    pub winner: &'a str,
    pub team_appearances: OrderedMap<String, usize>,
    pub matches: Vec<SeasonMatch<'a>>,
}

// Per season, latest first. Matches are listed in tournament order; team counts come from the match labels,
// the same way the dashboard derives them.
pub fn build_season_summaries<'a>(
    matches: &'a [MatchRecord],
    winners: &'a SeasonWinners,
    seasons: &[u16],
) -> OrderedMap<u16, SeasonSummary<'a>> {
    let mut summaries = OrderedMap::new();

    for &season in seasons {
        let mut season_matches: Vec<&MatchRecord> = matches.iter().filter(|m| m.season == season).collect();
        sort_by_round(&mut season_matches, |m| m.round.as_str());

        let mut appearances: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for m in &season_matches {
            let Some((team_1, team_2)) = parse_match_label(&match_label(m)) else {
                continue;
            };
            for team in [team_1, team_2] {
                match index.get(&team) {
                    Some(&i) => appearances[i].1 += 1,
                    None => {
                        index.insert(team.clone(), appearances.len());
                        appearances.push((team, 1));
                    }
                }
            }
        }
        appearances.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut team_appearances = OrderedMap::new();
        for (team, count) in appearances {
            team_appearances.push(team, count);
        }

        summaries.push(season, SeasonSummary {
            matches_played: season_matches.len(),
            teams: team_appearances.len(),
            winner: winners.winner_or_placeholder(season),
            team_appearances,
            matches: season_matches
                .iter()
                .map(|m| SeasonMatch {
                    round: &m.round,
                    sort_key: match_sort_key(&m.round),
                    label: match_label(m),
                    date: m.date,
                    time: m.time.as_deref(),
                    winner: m.winner.as_deref(),
                })
                .collect(),
        });
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_context::WINNER_NOT_AVAILABLE;
    use crate::test::{tables_from_csv, BATTING_HEADER, BOWLING_HEADER, MATCH_HEADER};

    fn tables() -> Tables {
        tables_from_csv(
            &format!(
                "{MATCH_HEADER}\n\
                 2023,Gujarat Titans,Chennai Super Kings,Final,2023-05-29,Chennai Super Kings,won by 5 wickets\n\
                 2023,Gujarat Titans,Chennai Super Kings,1st Match,2023-03-31,Gujarat Titans,won by 5 wickets\n\
                 2023,Gujarat Titans,Mumbai Indians,Qualifier 2,2023-05-26,Gujarat Titans,won by 62 runs\n\
                 2023,Mumbai Indians,Royal Challengers Bangalore,5th Match,2023-04-02,,No result\n\
                 2031,Kings XI Punjab,Delhi Daredevils,Match 1,2031-03-20,,\n"
            ),
            BATTING_HEADER,
            BOWLING_HEADER,
        )
        .unwrap()
    }

    #[test]
    fn label_round_trips_through_parser() {
        let tables = tables();
        let m = &tables.matches[0];

        assert_eq!(match_label(m), "GUJARAT TITANS vs CHENNAI SUPER KINGS, Final");
        assert_eq!(
            parse_match_label(&match_label(m)),
            Some(("GUJARAT TITANS".to_owned(), "CHENNAI SUPER KINGS".to_owned()))
        );
        assert_eq!(parse_match_label("no separator here"), None);
    }

    #[test]
    fn matches_are_in_tournament_order() {
        let tables = tables();
        let winners = SeasonWinners::builtin();
        let summaries = build_season_summaries(&tables.matches, &winners, &tables.seasons());
        let rounds: Vec<_> = summaries.get(&2023).unwrap().matches.iter().map(|m| m.round).collect();

        assert_eq!(rounds, vec!["1st Match", "5th Match", "Qualifier 2", "Final"]);
    }

    #[test]
    fn counters_and_winner() {
        let tables = tables();
        let winners = SeasonWinners::builtin();
        let summaries = build_season_summaries(&tables.matches, &winners, &tables.seasons());

        assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec![2031, 2023]);

        let season = summaries.get(&2023).unwrap();
        assert_eq!(season.matches_played, 4);
        assert_eq!(season.teams, 4);
        assert_eq!(season.winner, "Chennai Super Kings");
        assert_eq!(season.team_appearances.get("GUJARAT TITANS"), Some(&3));
        assert_eq!(season.team_appearances.keys().next().map(String::as_str), Some("GUJARAT TITANS"));
        assert_eq!(season.team_appearances.get("ROYAL CHALLENGERS BENGALURU"), Some(&1));

        assert_eq!(summaries.get(&2031).unwrap().winner, WINNER_NOT_AVAILABLE);
    }

    #[test]
    fn dashboard_matches_are_keyed_by_label() {
        let tables = tables();
        let dashboard = build_dashboard_matches(&tables.matches);
        let json = serde_json::to_value(&dashboard).unwrap();

        assert_eq!(dashboard.len(), 5);
        assert_eq!(json["PUNJAB KINGS vs DELHI CAPITALS, Match 1"]["match_info"]["IPL Edition"], 2031);
    }

    #[test]
    fn dashboard_match_info_uses_source_column_names() {
        let tables = tables();
        let json = serde_json::to_value(build_dashboard_matches(&tables.matches)).unwrap();
        let info = &json["GUJARAT TITANS vs CHENNAI SUPER KINGS, Final"]["match_info"];

        assert_eq!(info["IPL Edition"], 2023);
        assert_eq!(info["Match Details"], "Final");
        assert_eq!(info["Date"], "2023-05-29");
        assert_eq!(info["Time"], serde_json::Value::Null);
        assert_eq!(info["Winner"], "CHENNAI SUPER KINGS");
        assert_eq!(info["Winning Details"], "won by 5 wickets");
        assert!(info.get("season").is_none());
    }
}
