use crate::cup::CupState;
use crate::stats::{Competition, MatchRecord};
use serde::Serialize;
use std::collections::HashMap;

/// Stage label for a cup round, counted so the highest round is the final.
pub fn stage_label(round: u32, max_round: u32) -> String {
    match max_round.saturating_sub(round) {
        0 => "Final".to_string(),
        1 => "Semifinal".to_string(),
        2 => "Quarterfinal".to_string(),
        _ => format!("Round {round}"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketMatch {
    pub match_id: String,
    pub home: String,
    pub away: String,
    pub home_goals: u8,
    pub away_goals: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketRound {
    pub round: u32,
    pub name: String,
    pub matches: Vec<BracketMatch>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CupBracket {
    pub rounds: Vec<BracketRound>,
    pub alive: Vec<String>,
    pub finished: bool,
    pub winner: Option<String>,
}

/// Bracket projection for the contract, rebuilt from the cup portion of the
/// match log.
pub fn build_cup_bracket(state: Option<&CupState>, match_log: &[MatchRecord]) -> CupBracket {
    let cup_records: Vec<&MatchRecord> = match_log
        .iter()
        .filter(|record| record.competition == Competition::Cup)
        .collect();

    let max_round = cup_records.iter().map(|r| r.round).max().unwrap_or(0);
    // The label offset must cover rounds still to be played.
    let projected_max = state
        .map(|s| projected_total_rounds(s, max_round))
        .unwrap_or(max_round);

    let mut rounds: Vec<BracketRound> = Vec::new();
    for round in 1..=max_round {
        let matches: Vec<BracketMatch> = cup_records
            .iter()
            .filter(|record| record.round == round)
            .map(|record| BracketMatch {
                match_id: record.match_id(),
                home: record.home.clone(),
                away: record.away.clone(),
                home_goals: record.home_goals,
                away_goals: record.away_goals,
            })
            .collect();
        rounds.push(BracketRound {
            round,
            name: stage_label(round, projected_max),
            matches,
        });
    }

    CupBracket {
        rounds,
        alive: state.map(|s| s.current_clubs.clone()).unwrap_or_default(),
        finished: state.map(|s| s.finished).unwrap_or(false),
        winner: state.and_then(|s| s.winner.clone()),
    }
}

/// Total rounds the tournament will have, given the clubs still alive.
fn projected_total_rounds(state: &CupState, played: u32) -> u32 {
    let mut remaining = 0u32;
    let mut alive = state.current_clubs.len();
    while alive > 1 {
        alive = alive.div_ceil(2);
        remaining += 1;
    }
    played + remaining
}

/// Cup-result labels per club for the season history: how far each club
/// got, with the champion marked as winner.
pub fn cup_result_labels(
    state: Option<&CupState>,
    match_log: &[MatchRecord],
) -> HashMap<String, String> {
    let cup_records: Vec<&MatchRecord> = match_log
        .iter()
        .filter(|record| record.competition == Competition::Cup)
        .collect();
    if cup_records.is_empty() {
        return HashMap::new();
    }

    let max_round = cup_records.iter().map(|r| r.round).max().unwrap_or(0);
    if max_round == 0 {
        return HashMap::new();
    }

    let mut deepest: HashMap<String, u32> = HashMap::new();
    for record in &cup_records {
        for name in [&record.home, &record.away] {
            if name.is_empty() {
                continue;
            }
            let entry = deepest.entry(name.clone()).or_insert(0);
            *entry = (*entry).max(record.round);
        }
    }

    let winner: Option<String> = state
        .filter(|s| s.finished)
        .and_then(|s| s.winner.clone())
        .or_else(|| {
            // Finished final without a recorded winner: read the scoreline.
            cup_records
                .iter()
                .filter(|record| record.round == max_round)
                .next_back()
                .and_then(|record| {
                    if record.home_goals > record.away_goals {
                        Some(record.home.clone())
                    } else if record.away_goals > record.home_goals {
                        Some(record.away.clone())
                    } else {
                        None
                    }
                })
        });

    let mut labels = HashMap::new();
    for (club, stage) in deepest {
        if winner.as_deref() == Some(club.as_str()) {
            labels.insert(club, "Winner".to_string());
        } else {
            labels.insert(club, stage_label(stage, max_round));
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cup::CupRules;

    fn record(round: u32, home: &str, away: &str, hg: u8, ag: u8) -> MatchRecord {
        serde_json::from_value(serde_json::json!({
            "competition": "cup",
            "round": round,
            "home": home,
            "away": away,
            "home_goals": hg,
            "away_goals": ag,
        }))
        .unwrap()
    }

    #[test]
    fn stage_labels_count_back_from_the_final() {
        assert_eq!(stage_label(3, 3), "Final");
        assert_eq!(stage_label(2, 3), "Semifinal");
        assert_eq!(stage_label(1, 3), "Quarterfinal");
        assert_eq!(stage_label(1, 5), "Round 1");
    }

    #[test]
    fn labels_mark_the_winner_and_stages() {
        let log = vec![
            record(1, "Alfa", "Beta", 2, 0),
            record(1, "Ceres", "Delta", 1, 3),
            record(2, "Alfa", "Delta", 1, 0),
        ];
        let state = CupState {
            rules: CupRules::default(),
            current_clubs: vec!["Alfa".to_string()],
            round_index: 2,
            finished: true,
            winner: Some("Alfa".to_string()),
        };

        let labels = cup_result_labels(Some(&state), &log);
        assert_eq!(labels["Alfa"], "Winner");
        assert_eq!(labels["Delta"], "Final");
        assert_eq!(labels["Beta"], "Semifinal");
        assert_eq!(labels["Ceres"], "Semifinal");
    }

    #[test]
    fn bracket_groups_matches_by_round() {
        let log = vec![
            record(1, "Alfa", "Beta", 2, 0),
            record(1, "Ceres", "Delta", 1, 3),
            record(2, "Alfa", "Delta", 1, 0),
        ];
        let bracket = build_cup_bracket(None, &log);
        assert_eq!(bracket.rounds.len(), 2);
        assert_eq!(bracket.rounds[0].matches.len(), 2);
        assert_eq!(bracket.rounds[1].name, "Final");
    }
}
