use crate::club::{Club, Position, Tactic};
use crate::r#match::events::MatchEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(default)]
    pub goals: u8,
    #[serde(default)]
    pub shots: u8,
    #[serde(default)]
    pub shots_on: u8,
    #[serde(default)]
    pub saves: u8,
    #[serde(default)]
    pub corners: u8,
    #[serde(default)]
    pub fouls: u8,
    #[serde(default)]
    pub offsides: u8,
    #[serde(default)]
    pub yellows: u8,
    #[serde(default)]
    pub reds: u8,
    #[serde(default)]
    pub penalties: u8,
    #[serde(default = "even_possession")]
    pub possession_pct: u8,
}

fn even_possession() -> u8 {
    50
}

impl Default for TeamStats {
    fn default() -> Self {
        TeamStats {
            goals: 0,
            shots: 0,
            shots_on: 0,
            saves: 0,
            corners: 0,
            fouls: 0,
            offsides: 0,
            yellows: 0,
            reds: 0,
            penalties: 0,
            possession_pct: 50,
        }
    }
}

/// Average rating per unit: goalkeeper+defence, midfield, attack.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnitRatings {
    #[serde(default)]
    pub def: f32,
    #[serde(default)]
    pub mid: f32,
    #[serde(default)]
    pub fwd: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RatingsByUnit {
    #[serde(default)]
    pub home: UnitRatings,
    #[serde(default)]
    pub away: UnitRatings,
}

/// How a club actually set up for one match, frozen into the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticSnapshot {
    #[serde(default)]
    pub formation: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub aggressiveness: String,
    #[serde(default)]
    pub pressing: bool,
    #[serde(default)]
    pub long_balls: bool,
    #[serde(default)]
    pub offside_trap: bool,
    #[serde(default)]
    pub dark_arts: bool,
    #[serde(default)]
    pub captain_id: Option<u32>,
}

impl TacticSnapshot {
    pub fn for_club(club: &Club, xi_positions: &[Position]) -> TacticSnapshot {
        let tactic: &Tactic = &club.tactic;
        let tempo = tactic.tempo;
        let style = if tempo >= 1.1 {
            "Attacking"
        } else if tempo <= 0.9 {
            "Patient"
        } else {
            "Normal"
        };

        let defenders = xi_positions.iter().filter(|p| **p == Position::DF).count();
        let midfielders = xi_positions.iter().filter(|p| **p == Position::MF).count();
        let forwards = xi_positions.iter().filter(|p| **p == Position::FW).count();

        TacticSnapshot {
            formation: format!("{defenders}-{midfielders}-{forwards}"),
            style: style.to_string(),
            aggressiveness: club.aggressiveness.as_str().to_string(),
            pressing: tactic.attacking,
            long_balls: tempo >= 1.1,
            offside_trap: tactic.offside_trap,
            dark_arts: tactic.dark_arts,
            captain_id: club.captain_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticReport {
    #[serde(default)]
    pub home: TacticSnapshot,
    #[serde(default)]
    pub away: TacticSnapshot,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MatchAwards {
    #[serde(default)]
    pub mom_home: Option<u32>,
    #[serde(default)]
    pub mom_away: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefereeReport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill: u8,
    #[serde(default)]
    pub hardness: u8,
}

/// Complete kernel output for one simulated match. Clubs are referenced by
/// name, players by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub home: String,
    pub away: String,
    pub home_stats: TeamStats,
    pub away_stats: TeamStats,
    pub halftime_home: u8,
    pub halftime_away: u8,
    pub events: Vec<MatchEvent>,
    pub ratings: HashMap<u32, f32>,
    pub home_lineup: Vec<u32>,
    pub away_lineup: Vec<u32>,
    pub home_bench: Vec<u32>,
    pub away_bench: Vec<u32>,
    pub home_minutes: HashMap<u32, u8>,
    pub away_minutes: HashMap<u32, u8>,
    pub formation_home: String,
    pub formation_away: String,
    pub ratings_by_unit: RatingsByUnit,
    pub tactic_report: TacticReport,
    pub awards: MatchAwards,
    pub referee: RefereeReport,
    pub dark_arts_home: bool,
    pub dark_arts_away: bool,
}

impl MatchResult {
    /// All-zero result for a pairing where a side could not field a team.
    pub fn goalless(home: &str, away: &str, referee: RefereeReport) -> Self {
        MatchResult {
            home: home.to_string(),
            away: away.to_string(),
            home_stats: TeamStats::default(),
            away_stats: TeamStats::default(),
            halftime_home: 0,
            halftime_away: 0,
            events: Vec::new(),
            ratings: HashMap::new(),
            home_lineup: Vec::new(),
            away_lineup: Vec::new(),
            home_bench: Vec::new(),
            away_bench: Vec::new(),
            home_minutes: HashMap::new(),
            away_minutes: HashMap::new(),
            formation_home: String::new(),
            formation_away: String::new(),
            ratings_by_unit: RatingsByUnit::default(),
            tactic_report: TacticReport::default(),
            awards: MatchAwards::default(),
            referee,
            dark_arts_home: false,
            dark_arts_away: false,
        }
    }

    pub fn home_goals(&self) -> u8 {
        self.home_stats.goals
    }

    pub fn away_goals(&self) -> u8 {
        self.away_stats.goals
    }

    pub fn is_home_win(&self) -> bool {
        self.home_goals() > self.away_goals()
    }

    pub fn is_draw(&self) -> bool {
        self.home_goals() == self.away_goals()
    }
}
