use crate::club::player::{Player, Position};
use crate::club::tactics::{Aggressiveness, SubstitutionRule, Tactic};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_SQUAD_SIZE: usize = 13;
pub const MAX_SQUAD_SIZE: usize = 30;

/// Positional minima that must hold after every transfer or junior intake:
/// GK>=1, DF>=4, MF>=4, FW>=2.
pub const POSITION_MINIMA: [(Position, usize); 4] = [
    (Position::GK, 1),
    (Position::DF, 4),
    (Position::MF, 4),
    (Position::FW, 2),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubColors {
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    #[serde(default)]
    pub club_id: String,

    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub cash_sek: i64,

    #[serde(default)]
    pub captain_id: Option<u32>,
    #[serde(default)]
    pub preferred_lineup: Vec<u32>,
    #[serde(default)]
    pub bench_order: Vec<u32>,
    #[serde(default)]
    pub substitution_plan: Vec<SubstitutionRule>,

    #[serde(default)]
    pub tactic: Tactic,
    #[serde(default)]
    pub aggressiveness: Aggressiveness,

    #[serde(default)]
    pub stadium_name: Option<String>,
    #[serde(default)]
    pub colors: ClubColors,
    #[serde(default)]
    pub emblem_path: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,

    #[serde(default)]
    pub trophies: Vec<String>,
}

impl Club {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let club_id = crate::utils::slugify_with_prefix(&name, "t");
        Club {
            name,
            club_id,
            players: Vec::new(),
            cash_sek: 0,
            captain_id: None,
            preferred_lineup: Vec::new(),
            bench_order: Vec::new(),
            substitution_plan: Vec::new(),
            tactic: Tactic::default(),
            aggressiveness: Aggressiveness::default(),
            stadium_name: None,
            colors: ClubColors::default(),
            emblem_path: None,
            manager_name: None,
            trophies: Vec::new(),
        }
    }

    pub fn average_skill(&self) -> f64 {
        if self.players.is_empty() {
            return 0.0;
        }
        let total: u32 = self.players.iter().map(|p| p.skill_open as u32).sum();
        total as f64 / self.players.len() as f64
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn has_player(&self, id: u32) -> bool {
        self.player(id).is_some()
    }

    pub fn stadium(&self) -> String {
        self.stadium_name
            .clone()
            .unwrap_or_else(|| format!("{} Arena", self.name))
    }

    pub fn position_count(&self, position: Position) -> usize {
        self.players.iter().filter(|p| p.position == position).count()
    }

    pub fn take_player(&mut self, id: u32) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        self.remove_player_references(id);
        Some(player)
    }

    /// Scrub a departed player from every derived reference: lineup, bench,
    /// substitution plan and captaincy.
    pub fn remove_player_references(&mut self, id: u32) {
        self.preferred_lineup.retain(|pid| *pid != id);
        self.bench_order.retain(|pid| *pid != id);
        self.substitution_plan
            .retain(|rule| rule.player_in != Some(id) && rule.player_out != Some(id));
        if self.captain_id == Some(id) {
            self.captain_id = None;
        }
    }
}

/// Validates squad size and positional minima for the roster that would
/// result from adding `add` and removing `remove_ids`.
pub fn check_squad_limits(
    club: &Club,
    add: &[&Player],
    remove_ids: &[u32],
) -> Result<(), DomainError> {
    let removed: HashSet<u32> = remove_ids.iter().copied().collect();

    let mut total = 0usize;
    let mut by_position = [(Position::GK, 0usize), (Position::DF, 0), (Position::MF, 0), (Position::FW, 0)];

    let mut bump = |position: Position| {
        for entry in by_position.iter_mut() {
            if entry.0 == position {
                entry.1 += 1;
            }
        }
    };

    for player in club.players.iter().filter(|p| !removed.contains(&p.id)) {
        total += 1;
        bump(player.position);
    }
    for player in add {
        total += 1;
        bump(player.position);
    }

    if total < MIN_SQUAD_SIZE {
        return Err(DomainError::rule(format!(
            "{}: truppen får inte understiga min {} spelare (blev {})",
            club.name, MIN_SQUAD_SIZE, total
        )));
    }
    if total > MAX_SQUAD_SIZE {
        return Err(DomainError::rule(format!(
            "{}: truppen får inte överstiga max {} spelare (blev {})",
            club.name, MAX_SQUAD_SIZE, total
        )));
    }

    for (position, minimum) in POSITION_MINIMA {
        let count = by_position
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        if count < minimum {
            return Err(DomainError::rule(format!(
                "{}: minst {} {} krävs (blev {})",
                club.name, minimum, position, count
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player(id: u32, position: Position) -> Player {
        Player {
            id,
            first_name: format!("P{id}"),
            last_name: "Test".into(),
            age: 24,
            position,
            number: (id % 99) as u8 + 1,
            skill_open: 6,
            skill_hidden: 50,
            form_now: 10,
            form_season: 10.0,
            traits: vec![],
            value_sek: 0,
        }
    }

    fn make_club() -> Club {
        let mut club = Club::new("Test FC");
        let mut id = 1;
        for (position, count) in [
            (Position::GK, 2),
            (Position::DF, 5),
            (Position::MF, 5),
            (Position::FW, 4),
        ] {
            for _ in 0..count {
                club.players.push(make_player(id, position));
                id += 1;
            }
        }
        club
    }

    #[test]
    fn average_skill_of_empty_club_is_zero() {
        assert_eq!(Club::new("Empty").average_skill(), 0.0);
    }

    #[test]
    fn squad_limits_accept_a_regular_roster() {
        let club = make_club();
        assert!(check_squad_limits(&club, &[], &[]).is_ok());
    }

    #[test]
    fn removing_the_only_goalkeepers_is_rejected() {
        let club = make_club();
        let gk_ids: Vec<u32> = club
            .players
            .iter()
            .filter(|p| p.position == Position::GK)
            .map(|p| p.id)
            .collect();
        let err = check_squad_limits(&club, &[], &gk_ids).unwrap_err();
        assert!(err.to_string().contains("GK"));
    }

    #[test]
    fn exceeding_max_squad_is_rejected() {
        let mut club = make_club();
        let mut id = 100;
        while club.players.len() < MAX_SQUAD_SIZE {
            club.players.push(make_player(id, Position::MF));
            id += 1;
        }
        let extra = make_player(999, Position::MF);
        assert!(check_squad_limits(&club, &[&extra], &[]).is_err());
    }

    #[test]
    fn dropping_below_min_squad_is_rejected() {
        let club = make_club(); // 16 players
        let remove: Vec<u32> = club.players.iter().take(4).map(|p| p.id).collect();
        assert!(check_squad_limits(&club, &[], &remove).is_err());
    }

    #[test]
    fn take_player_scrubs_references() {
        let mut club = make_club();
        let target = club.players[0].id;
        club.preferred_lineup = vec![target, 2, 3];
        club.bench_order = vec![target, 4];
        club.captain_id = Some(target);
        club.substitution_plan = vec![SubstitutionRule::planned(60, target, 2)];

        let taken = club.take_player(target).unwrap();
        assert_eq!(taken.id, target);
        assert!(!club.preferred_lineup.contains(&target));
        assert!(!club.bench_order.contains(&target));
        assert!(club.captain_id.is_none());
        assert!(club.substitution_plan.is_empty());
    }
}
