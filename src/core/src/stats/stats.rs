use serde::{Deserialize, Serialize};

/// Accumulated player statistics. The same shape serves the season map,
/// the per-season archive and the career map; only the career map uses
/// the `seasons` counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub player_id: u32,
    #[serde(default)]
    pub club_name: String,
    #[serde(default)]
    pub appearances: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub penalties: u32,
    #[serde(default)]
    pub offsides: u32,
    #[serde(default)]
    pub yellows: u32,
    #[serde(default)]
    pub reds: u32,
    #[serde(default)]
    pub injuries: u32,
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub rating_sum: f64,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub seasons: u32,
}

impl PlayerStats {
    pub fn new(player_id: u32, club_name: impl Into<String>) -> Self {
        PlayerStats {
            player_id,
            club_name: club_name.into(),
            ..PlayerStats::default()
        }
    }

    pub fn rating_avg(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.rating_sum / self.rating_count as f64
        }
    }

    /// Scorer points: goals plus assists.
    pub fn points(&self) -> u32 {
        self.goals + self.assists
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubStats {
    #[serde(default)]
    pub club_name: String,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub yellows: u32,
    #[serde(default)]
    pub reds: u32,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub shots_on: u32,
    #[serde(default)]
    pub shots_against: u32,
    #[serde(default)]
    pub corners: u32,
    #[serde(default)]
    pub offsides: u32,
    #[serde(default)]
    pub fouls: u32,
    #[serde(default)]
    pub saves: u32,
    #[serde(default)]
    pub possession_for: u32,
    #[serde(default)]
    pub possession_against: u32,
    #[serde(default)]
    pub seasons: u32,
}

impl ClubStats {
    pub fn new(club_name: impl Into<String>) -> Self {
        ClubStats {
            club_name: club_name.into(),
            ..ClubStats::default()
        }
    }

    pub fn points(&self) -> u32 {
        self.wins * 3 + self.draws
    }

    pub fn possession_avg(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            self.possession_for as f64 / self.played as f64
        }
    }
}
