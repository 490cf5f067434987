use crate::r#match::{MatchAwards, MatchEvent, MatchResult, RatingsByUnit, RefereeReport, TacticReport, TeamStats};
use crate::utils::slugify;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    #[default]
    League,
    Cup,
}

impl Competition {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Competition::League => "l",
            Competition::Cup => "c",
        }
    }
}

/// Immutable match-log entry. Every field defaults, so records written by
/// older versions (or hand-edited saves) coerce into the canonical shape on
/// load instead of failing. The log spans seasons; `season` scopes each
/// record so the current season's statistics can be rebuilt from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub competition: Competition,
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub away: String,
    #[serde(default)]
    pub home_goals: u8,
    #[serde(default)]
    pub away_goals: u8,
    #[serde(default)]
    pub halftime_home: u8,
    #[serde(default)]
    pub halftime_away: u8,
    #[serde(default)]
    pub events: Vec<MatchEvent>,
    #[serde(default)]
    pub ratings: HashMap<u32, f32>,
    #[serde(default)]
    pub lineup_home: Vec<u32>,
    #[serde(default)]
    pub lineup_away: Vec<u32>,
    #[serde(default)]
    pub bench_home: Vec<u32>,
    #[serde(default)]
    pub bench_away: Vec<u32>,
    #[serde(default)]
    pub minutes_home: HashMap<u32, u8>,
    #[serde(default)]
    pub minutes_away: HashMap<u32, u8>,
    #[serde(default)]
    pub formation_home: Option<String>,
    #[serde(default)]
    pub formation_away: Option<String>,
    #[serde(default)]
    pub home_stats: TeamStats,
    #[serde(default)]
    pub away_stats: TeamStats,
    #[serde(default)]
    pub ratings_by_unit: RatingsByUnit,
    #[serde(default)]
    pub tactic_report: TacticReport,
    #[serde(default)]
    pub awards: MatchAwards,
    #[serde(default)]
    pub referee: RefereeReport,
    #[serde(default)]
    pub dark_arts_home: bool,
    #[serde(default)]
    pub dark_arts_away: bool,
}

impl MatchRecord {
    pub fn from_result(
        result: &MatchResult,
        competition: Competition,
        season: u32,
        round: u32,
    ) -> Self {
        MatchRecord {
            competition,
            season,
            round,
            home: result.home.clone(),
            away: result.away.clone(),
            home_goals: result.home_stats.goals,
            away_goals: result.away_stats.goals,
            halftime_home: result.halftime_home,
            halftime_away: result.halftime_away,
            events: result.events.clone(),
            ratings: result.ratings.clone(),
            lineup_home: result.home_lineup.clone(),
            lineup_away: result.away_lineup.clone(),
            bench_home: result.home_bench.clone(),
            bench_away: result.away_bench.clone(),
            minutes_home: result.home_minutes.clone(),
            minutes_away: result.away_minutes.clone(),
            formation_home: Some(result.formation_home.clone()),
            formation_away: Some(result.formation_away.clone()),
            home_stats: result.home_stats,
            away_stats: result.away_stats,
            ratings_by_unit: result.ratings_by_unit,
            tactic_report: result.tactic_report.clone(),
            awards: result.awards,
            referee: result.referee.clone(),
            dark_arts_home: result.dark_arts_home,
            dark_arts_away: result.dark_arts_away,
        }
    }

    /// Synthetic id shared by fixtures and the match index:
    /// `{l|c}-{round:02}-{slug(home)}-{slug(away)}`.
    pub fn match_id(&self) -> String {
        make_match_id(self.competition, self.round, &self.home, &self.away)
    }
}

pub fn make_match_id(competition: Competition, round: u32, home: &str, away: &str) -> String {
    format!(
        "{}-{:02}-{}-{}",
        competition.id_prefix(),
        round,
        slugify(home),
        slugify(away)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_uses_prefix_round_and_slugs() {
        assert_eq!(
            make_match_id(Competition::League, 3, "Test FC", "Real Kramfors"),
            "l-03-test-fc-real-kramfors"
        );
        assert_eq!(
            make_match_id(Competition::Cup, 12, "A", "B"),
            "c-12-a-b"
        );
    }

    #[test]
    fn legacy_minimal_record_coerces_with_defaults() {
        let json = r#"{
            "competition": "league",
            "round": 2,
            "home": "Alfa",
            "away": "Beta",
            "home_goals": 3,
            "away_goals": 1
        }"#;
        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.home_goals, 3);
        assert!(record.events.is_empty());
        assert!(record.ratings.is_empty());
        assert_eq!(record.season, 0, "legacy records carry no season yet");
        assert_eq!(record.match_id(), "l-02-alfa-beta");
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record: MatchRecord = serde_json::from_str(
            r#"{"competition": "cup", "round": 1, "home": "A", "away": "B"}"#,
        )
        .unwrap();
        record.ratings.insert(12, 7.25);
        record.minutes_home.insert(12, 90);

        let json = serde_json::to_string(&record).unwrap();
        let back: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.competition, Competition::Cup);
        assert_eq!(back.ratings.get(&12), Some(&7.25));
        assert_eq!(back.minutes_home.get(&12), Some(&90));
    }
}
