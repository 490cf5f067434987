use crate::club::Club;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueFormat {
    Pyramid,
    /// A single ladder of parallel divisions without a widening base.
    #[default]
    #[serde(alias = "rak")]
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueRules {
    #[serde(default)]
    pub format: LeagueFormat,
    #[serde(default = "default_teams_per_div")]
    pub teams_per_div: usize,
    #[serde(default = "default_levels")]
    pub levels: u8,
    #[serde(default = "default_double_round")]
    pub double_round: bool,
    #[serde(default)]
    pub promote: usize,
    #[serde(default)]
    pub relegate: usize,
    /// Division count per level, top first. Missing levels default to 1.
    #[serde(default)]
    pub divisions_per_level: Vec<usize>,
}

fn default_teams_per_div() -> usize {
    16
}

fn default_levels() -> u8 {
    1
}

fn default_double_round() -> bool {
    true
}

impl Default for LeagueRules {
    fn default() -> Self {
        LeagueRules {
            format: LeagueFormat::Flat,
            teams_per_div: 16,
            levels: 1,
            double_round: true,
            promote: 0,
            relegate: 0,
            divisions_per_level: Vec::new(),
        }
    }
}

impl LeagueRules {
    pub fn divisions_at_level(&self, level: u8) -> usize {
        self.divisions_per_level
            .get(level.saturating_sub(1) as usize)
            .copied()
            .filter(|count| *count > 0)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    /// 1 = top flight.
    pub level: u8,
    #[serde(default)]
    pub clubs: Vec<Club>,
}

impl Division {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Division {
            name: name.into(),
            level,
            clubs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub rules: LeagueRules,
    #[serde(default)]
    pub divisions: Vec<Division>,
}

impl League {
    pub fn new(name: impl Into<String>, rules: LeagueRules) -> Self {
        League {
            name: name.into(),
            rules,
            divisions: Vec::new(),
        }
    }

    pub fn clubs(&self) -> impl Iterator<Item = &Club> {
        self.divisions.iter().flat_map(|div| div.clubs.iter())
    }

    pub fn clubs_mut(&mut self) -> impl Iterator<Item = &mut Club> {
        self.divisions.iter_mut().flat_map(|div| div.clubs.iter_mut())
    }

    pub fn club_by_name(&self, name: &str) -> Option<&Club> {
        self.clubs().find(|club| club.name.eq_ignore_ascii_case(name))
    }

    pub fn club_by_name_mut(&mut self, name: &str) -> Option<&mut Club> {
        self.clubs_mut().find(|club| club.name.eq_ignore_ascii_case(name))
    }

    pub fn club_by_id(&self, club_id: &str) -> Option<&Club> {
        self.clubs().find(|club| club.club_id == club_id)
    }

    pub fn division_of(&self, club_name: &str) -> Option<&Division> {
        self.divisions
            .iter()
            .find(|div| div.clubs.iter().any(|club| club.name == club_name))
    }

    /// Locate the club owning `player_id` together with the player.
    pub fn find_player(&self, player_id: u32) -> Option<(&Club, &crate::club::Player)> {
        for club in self.clubs() {
            if let Some(player) = club.player(player_id) {
                return Some((club, player));
            }
        }
        None
    }
}
