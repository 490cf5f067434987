use crate::club::{Player, Position, Trait};
use crate::stats::PlayerStats;

const BASE_VALUE_PER_BAR: f64 = 400_000.0;
const VALUE_FLOOR: i64 = 50_000;

fn age_factor(age: u8) -> f64 {
    match age {
        0..=20 => 1.35,
        21..=23 => 1.15,
        24..=28 => 1.0,
        29..=31 => 0.85,
        _ => 0.70,
    }
}

fn trait_multiplier(player: &Player) -> f64 {
    let mut multiplier = 1.0;
    for player_trait in &player.traits {
        multiplier *= match player_trait {
            Trait::Leader | Trait::Intelligent | Trait::Stamina => 1.08,
            Trait::Fast => 1.05,
            Trait::PenaltySpec | Trait::FreekickSpec => 1.04,
            Trait::InjuryProne => 0.80,
            Trait::Inconsistent | Trait::CardProne => 0.90,
            Trait::Aggressive | Trait::Trainable => 1.0,
        };
    }
    multiplier
}

fn stats_bonus(stats: Option<&PlayerStats>) -> f64 {
    let Some(stats) = stats else {
        return 1.0;
    };
    let mut bonus = 1.0 + 0.03 * stats.goals as f64 + 0.015 * stats.assists as f64;
    let rating = stats.rating_avg();
    if rating > 6.5 {
        bonus *= 1.0 + (rating - 6.5) * 0.08;
    }
    bonus.clamp(0.8, 1.6)
}

/// Market value in SEK. Floors at 50 000 regardless of modifiers.
pub fn calculate_player_value(player: &Player, stats: Option<&PlayerStats>) -> i64 {
    let mut value = BASE_VALUE_PER_BAR * player.skill_open.max(1) as f64;
    value *= age_factor(player.age);

    let form_factor = (player.form_now as f64 + player.form_season as f64) / 20.0;
    value *= 0.85 + 0.15 * form_factor;

    value *= trait_multiplier(player);
    value *= stats_bonus(stats);

    if player.position == Position::GK {
        value *= 0.9;
    }

    (value.round() as i64).max(VALUE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(age: u8, skill: u8, position: Position, traits: Vec<Trait>) -> Player {
        Player {
            id: 1,
            first_name: "Test".into(),
            last_name: "Spelare".into(),
            age,
            position,
            number: 10,
            skill_open: skill,
            skill_hidden: 50,
            form_now: 10,
            form_season: 10.0,
            traits,
            value_sek: 0,
        }
    }

    #[test]
    fn youth_is_worth_more_than_veterans() {
        let young = player(19, 8, Position::MF, vec![]);
        let old = player(33, 8, Position::MF, vec![]);
        assert!(calculate_player_value(&young, None) > calculate_player_value(&old, None));
    }

    #[test]
    fn goalkeepers_take_a_haircut() {
        let keeper = player(25, 8, Position::GK, vec![]);
        let midfielder = player(25, 8, Position::MF, vec![]);
        assert!(calculate_player_value(&keeper, None) < calculate_player_value(&midfielder, None));
    }

    #[test]
    fn negative_traits_lower_the_value() {
        let fragile = player(25, 8, Position::MF, vec![Trait::InjuryProne]);
        let solid = player(25, 8, Position::MF, vec![]);
        assert!(calculate_player_value(&fragile, None) < calculate_player_value(&solid, None));
    }

    #[test]
    fn season_form_and_stats_raise_the_value() {
        let baseline = player(25, 8, Position::FW, vec![]);
        let stats = PlayerStats {
            goals: 12,
            assists: 5,
            rating_sum: 78.0,
            rating_count: 10,
            ..PlayerStats::new(1, "Alfa")
        };
        assert!(
            calculate_player_value(&baseline, Some(&stats))
                > calculate_player_value(&baseline, None)
        );
    }

    #[test]
    fn value_never_drops_below_the_floor() {
        let journeyman = player(40, 1, Position::GK, vec![Trait::InjuryProne, Trait::Inconsistent]);
        assert_eq!(calculate_player_value(&journeyman, None), 50_000);
    }
}
