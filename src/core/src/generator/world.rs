use crate::club::{Club, Player, Position, Trait};
use crate::economy::calculate_player_value;
use crate::generator::NameBank;
use crate::league::{Division, League, LeagueFormat, LeagueRules};
use crate::utils::GameRng;
use log::debug;
use std::collections::HashSet;

/// Squad layout for a freshly generated club: 21 players.
const SQUAD_LAYOUT: [(Position, usize); 4] = [
    (Position::GK, 2),
    (Position::DF, 7),
    (Position::MF, 7),
    (Position::FW, 5),
];

/// Position spread for market/youth players: mostly outfield.
pub fn random_position(rng: &mut GameRng) -> Position {
    let roll = rng.float();
    if roll < 0.15 {
        Position::GK
    } else if roll < 0.50 {
        Position::DF
    } else if roll < 0.80 {
        Position::MF
    } else {
        Position::FW
    }
}

fn random_age(rng: &mut GameRng) -> u8 {
    let roll = rng.float();
    if roll < 0.65 {
        rng.int(18, 28) as u8
    } else if roll < 0.90 {
        rng.int(16, 34) as u8
    } else {
        rng.int(35, 40) as u8
    }
}

fn random_skill(rng: &mut GameRng) -> u8 {
    rng.gauss(5.0, 1.6).round().clamp(1.0, 30.0) as u8
}

fn random_traits(rng: &mut GameRng) -> Vec<Trait> {
    let roll = rng.float();
    let count = if roll < 0.40 {
        0
    } else if roll < 0.75 {
        1
    } else if roll < 0.95 {
        2
    } else {
        3
    };

    let mut traits = Vec::new();
    for _ in 0..count {
        if let Some(picked) = rng.pick(&Trait::ALL) {
            if !traits.contains(picked) {
                traits.push(*picked);
            }
        }
    }
    traits
}

/// Forwards prefer the classic attacking shirts; everyone else draws a
/// free number in 1-99.
fn shirt_number(position: Position, taken: &mut HashSet<u8>, rng: &mut GameRng) -> u8 {
    const PREFERRED_FW: [u8; 5] = [7, 8, 9, 10, 11];
    if position == Position::FW && rng.chance(0.7) {
        for number in PREFERRED_FW {
            if taken.insert(number) {
                return number;
            }
        }
    }
    loop {
        let number = rng.int(1, 99) as u8;
        if taken.insert(number) {
            return number;
        }
    }
}

/// A single player with default distributions and names from the bank.
pub fn generate_player(id: u32, position: Position, rng: &mut GameRng) -> Player {
    let bank = NameBank::default();
    generate_player_with_bank(id, position, &bank, rng)
}

pub fn generate_player_with_bank(
    id: u32,
    position: Position,
    bank: &NameBank,
    rng: &mut GameRng,
) -> Player {
    Player {
        id,
        first_name: bank.first_name(rng),
        last_name: bank.last_name(rng),
        age: random_age(rng),
        position,
        number: rng.int(1, 99) as u8,
        skill_open: random_skill(rng),
        skill_hidden: rng.int(1, 99) as u8,
        form_now: rng.int(8, 12) as u8,
        form_season: 10.0,
        traits: random_traits(rng),
        value_sek: 0,
    }
}

/// A complete club with a 21-player squad, initial values, a default
/// lineup (GK + 4 DF + 4 MF + 2 FW by skill) and a captain.
pub fn generate_club(name: &str, bank: &NameBank, start_id: u32, rng: &mut GameRng) -> Club {
    let mut club = Club::new(name);
    let mut taken_numbers: HashSet<u8> = HashSet::new();
    let mut next_id = start_id;

    for (position, count) in SQUAD_LAYOUT {
        for _ in 0..count {
            let mut player = generate_player_with_bank(next_id, position, bank, rng);
            player.number = shirt_number(position, &mut taken_numbers, rng);
            player.value_sek = calculate_player_value(&player, None);
            club.players.push(player);
            next_id += 1;
        }
    }

    club.preferred_lineup = default_lineup(&club);
    club.captain_id = club
        .players
        .iter()
        .max_by_key(|p| (p.has_trait(Trait::Leader), p.skill_open, u32::MAX - p.id))
        .map(|p| p.id);

    club
}

/// 1 GK + 4 DF + 4 MF + 2 FW, best by skill within each unit.
fn default_lineup(club: &Club) -> Vec<u32> {
    let mut lineup = Vec::with_capacity(11);
    for (position, count) in [
        (Position::GK, 1usize),
        (Position::DF, 4),
        (Position::MF, 4),
        (Position::FW, 2),
    ] {
        let mut unit: Vec<&Player> = club
            .players
            .iter()
            .filter(|p| p.position == position)
            .collect();
        unit.sort_by(|a, b| b.skill_open.cmp(&a.skill_open).then(a.id.cmp(&b.id)));
        lineup.extend(unit.into_iter().take(count).map(|p| p.id));
    }
    lineup
}

/// Builds a full league pyramid (or flat ladder) according to the rules.
pub fn generate_league(name: &str, rules: LeagueRules, rng: &mut GameRng) -> League {
    let bank = NameBank::default();
    let mut league = League::new(name, rules.clone());

    let divisions_for = |level: u8| match rules.format {
        LeagueFormat::Pyramid => rules.divisions_at_level(level),
        LeagueFormat::Flat => 1,
    };

    let mut total_clubs = 0usize;
    for level in 1..=rules.levels {
        total_clubs += divisions_for(level) * rules.teams_per_div;
    }
    let mut team_names = bank.team_names(total_clubs).into_iter();

    let mut next_player_id: u32 = 1;
    for level in 1..=rules.levels {
        let divisions_at_level = divisions_for(level);
        for division_index in 1..=divisions_at_level {
            let division_name = if divisions_at_level == 1 {
                format!("Division {level}")
            } else {
                format!("Division {level}{}", suffix_letter(division_index))
            };
            let mut division = Division::new(division_name, level);
            for _ in 0..rules.teams_per_div {
                let club_name = team_names.next().unwrap_or_else(|| "Reservklubb".to_string());
                let club = generate_club(&club_name, &bank, next_player_id, rng);
                next_player_id += club.players.len() as u32;
                division.clubs.push(club);
            }
            league.divisions.push(division);
        }
    }

    debug!(
        "generator: built league '{}' with {} divisions",
        league.name,
        league.divisions.len()
    );
    league
}

fn suffix_letter(index: usize) -> char {
    (b'A' + ((index - 1) % 26) as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::{check_squad_limits, MIN_SQUAD_SIZE};

    #[test]
    fn generated_club_satisfies_squad_invariants() {
        let bank = NameBank::default();
        let mut rng = GameRng::seeded(1337);
        let club = generate_club("Test FC", &bank, 1, &mut rng);

        assert!(club.players.len() >= MIN_SQUAD_SIZE);
        assert!(check_squad_limits(&club, &[], &[]).is_ok());
        assert!(club.players.iter().all(|p| p.value_sek > 0));
        assert!(club.players.iter().all(|p| (16..=50).contains(&p.age)));
        assert!(club.players.iter().all(|p| (1..=30).contains(&p.skill_open)));

        let numbers: HashSet<u8> = club.players.iter().map(|p| p.number).collect();
        assert_eq!(numbers.len(), club.players.len(), "shirt numbers unique");
    }

    #[test]
    fn default_lineup_is_a_four_four_two() {
        let bank = NameBank::default();
        let mut rng = GameRng::seeded(7);
        let club = generate_club("Elva FC", &bank, 1, &mut rng);

        assert_eq!(club.preferred_lineup.len(), 11);
        let positions: Vec<Position> = club
            .preferred_lineup
            .iter()
            .map(|pid| club.player(*pid).unwrap().position)
            .collect();
        assert_eq!(positions.iter().filter(|p| **p == Position::GK).count(), 1);
        assert_eq!(positions.iter().filter(|p| **p == Position::DF).count(), 4);
        assert_eq!(positions.iter().filter(|p| **p == Position::MF).count(), 4);
        assert_eq!(positions.iter().filter(|p| **p == Position::FW).count(), 2);
    }

    #[test]
    fn generated_league_has_unique_player_ids() {
        let rules = LeagueRules {
            teams_per_div: 4,
            levels: 2,
            promote: 2,
            relegate: 2,
            ..LeagueRules::default()
        };
        let mut rng = GameRng::seeded(42);
        let league = generate_league("Testligan", rules, &mut rng);

        assert_eq!(league.divisions.len(), 2);
        let ids: Vec<u32> = league.clubs().flat_map(|c| c.players.iter().map(|p| p.id)).collect();
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn pyramid_format_widens_with_divisions_per_level() {
        let rules = LeagueRules {
            format: LeagueFormat::Pyramid,
            teams_per_div: 4,
            levels: 2,
            divisions_per_level: vec![1, 2],
            ..LeagueRules::default()
        };
        let mut rng = GameRng::seeded(9);
        let league = generate_league("Pyramiden", rules, &mut rng);
        assert_eq!(league.divisions.len(), 3);
        assert_eq!(league.divisions[1].name, "Division 2A");
        assert_eq!(league.divisions[2].name, "Division 2B");
    }
}
