use crate::club::{Club, Position, Trait};
use crate::r#match::events::{MatchEvent, MatchEventKind};
use crate::r#match::result::UnitRatings;
use crate::utils::GameRng;
use std::collections::HashMap;

/// Per-player event tallies used by the rating formula and the awards pick.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventImpact {
    pub goals: u8,
    pub assists: u8,
    pub yellows: u8,
    pub reds: u8,
}

pub fn event_impacts(events: &[MatchEvent]) -> HashMap<u32, EventImpact> {
    let mut impacts: HashMap<u32, EventImpact> = HashMap::new();
    for event in events {
        match event.kind {
            MatchEventKind::Goal | MatchEventKind::PenaltyScored => {
                if let Some(pid) = event.player_id {
                    impacts.entry(pid).or_default().goals += 1;
                }
                if event.kind == MatchEventKind::Goal {
                    if let Some(aid) = event.assist_id {
                        impacts.entry(aid).or_default().assists += 1;
                    }
                }
            }
            MatchEventKind::Yellow => {
                if let Some(pid) = event.player_id {
                    impacts.entry(pid).or_default().yellows += 1;
                }
            }
            MatchEventKind::Red => {
                if let Some(pid) = event.player_id {
                    impacts.entry(pid).or_default().reds += 1;
                }
            }
            _ => {}
        }
    }
    impacts
}

/// Match rating for one participant, clamped to [5.0, 9.5].
pub fn player_rating(
    club: &Club,
    player_id: u32,
    minutes: u8,
    impact: EventImpact,
    is_captain: bool,
    rng: &mut GameRng,
) -> f32 {
    let Some(player) = club.player(player_id) else {
        return 0.0;
    };

    let mut rating = 6.2 + 0.12 * (player.skill_open as f64 - 5.0) + rng.gauss(0.0, 0.6);

    rating += 0.9 * impact.goals as f64;
    rating += 0.4 * impact.assists as f64;
    rating -= 0.2 * impact.yellows as f64;
    rating -= 1.0 * impact.reds as f64;
    if is_captain {
        rating += 0.25;
    }

    let time_factor = (minutes as f64 / 90.0).max(0.3);
    rating *= time_factor;

    if player.has_trait(Trait::Leader) {
        rating += 0.1;
    }
    if player.has_trait(Trait::Aggressive) {
        rating -= 0.05;
    }

    rating.clamp(5.0, 9.5) as f32
}

/// Average rating per unit: goalkeeper+defence, midfield, attack.
pub fn unit_ratings(club: &Club, ratings: &HashMap<u32, f32>, participants: &[u32]) -> UnitRatings {
    let mut sums = [(0.0f64, 0u32); 3];

    for pid in participants {
        let Some(player) = club.player(*pid) else {
            continue;
        };
        let Some(rating) = ratings.get(pid) else {
            continue;
        };
        let slot = match player.position {
            Position::GK | Position::DF => 0,
            Position::MF => 1,
            Position::FW => 2,
        };
        sums[slot].0 += *rating as f64;
        sums[slot].1 += 1;
    }

    let avg = |(sum, count): (f64, u32)| {
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    };

    UnitRatings {
        def: avg(sums[0]),
        mid: avg(sums[1]),
        fwd: avg(sums[2]),
    }
}

/// Man of the match: lexicographic max over (rating, goals, assists,
/// minutes).
pub fn man_of_the_match(
    ratings: &HashMap<u32, f32>,
    impacts: &HashMap<u32, EventImpact>,
    minutes: &HashMap<u32, u8>,
    participants: &[u32],
) -> Option<u32> {
    participants
        .iter()
        .copied()
        .max_by_key(|pid| {
            let rating = ratings.get(pid).copied().unwrap_or(0.0);
            let impact = impacts.get(pid).copied().unwrap_or_default();
            (
                (rating * 1000.0) as i64,
                impact.goals,
                impact.assists,
                minutes.get(pid).copied().unwrap_or(0),
                // Stable tie-break so the pick is deterministic.
                u32::MAX - *pid,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::Player;

    fn club_with(players: Vec<Player>) -> Club {
        let mut club = Club::new("Betyg FC");
        club.players = players;
        club
    }

    fn player(id: u32, position: Position, skill: u8, traits: Vec<Trait>) -> Player {
        Player {
            id,
            first_name: format!("P{id}"),
            last_name: "Test".into(),
            age: 25,
            position,
            number: id as u8,
            skill_open: skill,
            skill_hidden: 50,
            form_now: 10,
            form_season: 10.0,
            traits,
            value_sek: 0,
        }
    }

    #[test]
    fn ratings_stay_in_bounds() {
        let club = club_with(vec![player(1, Position::FW, 30, vec![])]);
        let mut rng = GameRng::seeded(9);
        for _ in 0..50 {
            let impact = EventImpact {
                goals: 3,
                ..EventImpact::default()
            };
            let rating = player_rating(&club, 1, 90, impact, true, &mut rng);
            assert!((5.0..=9.5).contains(&rating));
        }
    }

    #[test]
    fn goals_raise_the_rating() {
        let club = club_with(vec![player(1, Position::FW, 6, vec![])]);
        let mut with_goals = 0.0;
        let mut without = 0.0;
        for seed in 0..40 {
            let mut rng_a = GameRng::seeded(seed);
            let mut rng_b = GameRng::seeded(seed);
            with_goals += player_rating(
                &club,
                1,
                90,
                EventImpact {
                    goals: 2,
                    ..EventImpact::default()
                },
                false,
                &mut rng_a,
            );
            without += player_rating(&club, 1, 90, EventImpact::default(), false, &mut rng_b);
        }
        assert!(with_goals > without);
    }

    #[test]
    fn impacts_are_extracted_from_events() {
        let events = vec![
            MatchEvent::new(10, MatchEventKind::Goal, Some(1)).with_assist(Some(2)),
            MatchEvent::new(55, MatchEventKind::PenaltyScored, Some(1)),
            MatchEvent::new(70, MatchEventKind::Yellow, Some(3)),
        ];
        let impacts = event_impacts(&events);
        assert_eq!(impacts[&1].goals, 2);
        assert_eq!(impacts[&2].assists, 1);
        assert_eq!(impacts[&3].yellows, 1);
    }

    #[test]
    fn mom_prefers_rating_then_goals() {
        let mut ratings = HashMap::new();
        ratings.insert(1, 7.5f32);
        ratings.insert(2, 7.5);
        ratings.insert(3, 6.0);
        let mut impacts = HashMap::new();
        impacts.insert(
            2,
            EventImpact {
                goals: 1,
                ..EventImpact::default()
            },
        );
        let minutes: HashMap<u32, u8> = [(1, 90), (2, 90), (3, 90)].into_iter().collect();

        let mom = man_of_the_match(&ratings, &impacts, &minutes, &[1, 2, 3]);
        assert_eq!(mom, Some(2));
    }

    #[test]
    fn unit_ratings_average_by_unit() {
        let club = club_with(vec![
            player(1, Position::GK, 5, vec![]),
            player(2, Position::DF, 5, vec![]),
            player(3, Position::MF, 5, vec![]),
            player(4, Position::FW, 5, vec![]),
        ]);
        let ratings: HashMap<u32, f32> =
            [(1, 6.0), (2, 8.0), (3, 7.0), (4, 9.0)].into_iter().collect();
        let units = unit_ratings(&club, &ratings, &[1, 2, 3, 4]);
        assert_eq!(units.def, 7.0);
        assert_eq!(units.mid, 7.0);
        assert_eq!(units.fwd, 9.0);
    }
}
