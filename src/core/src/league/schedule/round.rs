use crate::league::League;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One scheduled league game. Clubs are referenced by name and resolved
/// through the world on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
    pub round: u32,
}

impl Fixture {
    pub fn new(home: impl Into<String>, away: impl Into<String>, round: u32) -> Self {
        Fixture {
            home: home.into(),
            away: away.into(),
            round,
        }
    }
}

/// Classic round-robin over club names.
///
/// An odd field gets a bye slot; the pairing table keeps index 0 fixed and
/// rotates the rest once per round. Bye pairings are skipped, so round
/// numbers stay dense from 1. With `double_round` the reverse pairings are
/// appended as rounds `n..2n-2`.
pub fn round_robin(clubs: &[String], double_round: bool) -> Vec<Fixture> {
    if clubs.len() < 2 {
        warn!("schedule: fewer than two clubs, skip generation");
        return Vec::new();
    }

    let mut slots: Vec<Option<&str>> = clubs.iter().map(|name| Some(name.as_str())).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();

    let mut fixtures = Vec::with_capacity(clubs.len() * (clubs.len() - 1) / 2);
    let mut round_num: u32 = 1;

    for _ in 0..n - 1 {
        let mid = n / 2;
        let left = &slots[..mid];
        let right: Vec<Option<&str>> = slots[mid..].iter().rev().copied().collect();

        for (home, away) in left.iter().zip(right.iter()) {
            if let (Some(home), Some(away)) = (home, away) {
                fixtures.push(Fixture::new(*home, *away, round_num));
            }
        }
        round_num += 1;

        // Keep slot 0 fixed, rotate the remainder by one.
        let last = slots.pop().expect("non-empty slots");
        slots.insert(1, last);
    }

    if double_round {
        let single_rounds = round_num - 1;
        let reversed: Vec<Fixture> = fixtures
            .iter()
            .map(|m| Fixture::new(m.away.clone(), m.home.clone(), m.round + single_rounds))
            .collect();
        fixtures.extend(reversed);
    }

    fixtures
}

/// Fixture list per division name, following `league.rules.double_round`.
pub fn build_league_schedule(league: &League) -> HashMap<String, Vec<Fixture>> {
    let mut schedule = HashMap::with_capacity(league.divisions.len());
    for division in &league.divisions {
        let names: Vec<String> = division.clubs.iter().map(|c| c.name.clone()).collect();
        schedule.insert(
            division.name.clone(),
            round_robin(&names, league.rules.double_round),
        );
    }
    schedule
}

pub fn max_round(fixtures: &[Fixture]) -> u32 {
    fixtures.iter().map(|m| m.round).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("Club {i}")).collect()
    }

    #[test]
    fn double_round_emits_every_ordered_pair_once() {
        let clubs = names(6);
        let fixtures = round_robin(&clubs, true);

        assert_eq!(fixtures.len(), 6 * 5);

        let mut seen = HashSet::new();
        for m in &fixtures {
            assert!(seen.insert((m.home.clone(), m.away.clone())), "duplicate pairing");
        }
    }

    #[test]
    fn rounds_are_dense_and_start_at_one() {
        let clubs = names(6);
        let fixtures = round_robin(&clubs, true);
        let rounds: HashSet<u32> = fixtures.iter().map(|m| m.round).collect();
        assert_eq!(rounds, (1..=10).collect::<HashSet<u32>>());
    }

    #[test]
    fn no_club_plays_twice_in_one_round() {
        let clubs = names(8);
        let fixtures = round_robin(&clubs, true);
        for round in 1..=max_round(&fixtures) {
            let mut seen = HashSet::new();
            for m in fixtures.iter().filter(|m| m.round == round) {
                assert!(seen.insert(m.home.clone()), "{} twice in round {round}", m.home);
                assert!(seen.insert(m.away.clone()), "{} twice in round {round}", m.away);
            }
        }
    }

    #[test]
    fn odd_field_gets_a_bye_each_round() {
        let clubs = names(5);
        let fixtures = round_robin(&clubs, false);
        // 5 clubs => 5 rounds, 2 games each.
        assert_eq!(max_round(&fixtures), 5);
        for round in 1..=5 {
            assert_eq!(fixtures.iter().filter(|m| m.round == round).count(), 2);
        }
    }

    #[test]
    fn fewer_than_two_clubs_yields_empty_schedule() {
        assert!(round_robin(&names(1), true).is_empty());
        assert!(round_robin(&[], true).is_empty());
    }
}
