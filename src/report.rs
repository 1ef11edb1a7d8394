use crate::artifacts::Artifacts;
use crate::head_to_head::lookup;

pub fn output_report(artifacts: &Artifacts) {
    if artifacts.seasons.is_empty() {
        println!("No matches loaded");
        return;
    }

    let total_matches: usize = artifacts.seasons.iter().map(|(_, s)| s.matches_played).sum();
    // Seasons are stored latest first.
    let latest = artifacts.seasons.keys().next().copied().unwrap_or_default();
    let earliest = artifacts.seasons.keys().last().copied().unwrap_or_default();

    println!("Total matches: {0} | Total teams: {1} | Seasons: {2} ({3}-{4})",
        total_matches,
        artifacts.teams.len(),
        artifacts.seasons.len(),
        earliest,
        latest,
    );

    for (season, summary) in artifacts.seasons.iter() {
        let top_scorer = artifacts
            .leaderboards
            .get(season)
            .and_then(|board| board.top_batsmen.first())
            .map(|b| format!("{} ({})", b.player, b.runs))
            .unwrap_or_else(|| "-".to_owned());

        println!("|{0:6} | {1:3} matches | {2:2} teams | {3:30} | top scorer {4}",
            season,
            summary.matches_played,
            summary.teams,
            summary.winner,
            top_scorer,
        );
    }
}

pub fn output_head_to_head(artifacts: &Artifacts, team_1: &str, team_2: &str) {
    let Some(record) = lookup(&artifacts.head_to_head, team_1, team_2) else {
        println!("{team_1} and {team_2} have never met");
        return;
    };

    println!("{0} {1} - {2} {3} ({4} played)",
        team_1,
        record.team1_wins,
        record.team2_wins,
        team_2,
        record.total_matches,
    );

    for e in &record.recent_encounters {
        println!("  {0} | {1:30} | {2}",
            e.date,
            e.winner.as_deref().unwrap_or("no result"),
            e.winning_details.as_deref().unwrap_or(""),
        );
    }
}
