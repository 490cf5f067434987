use crate::club::Club;
use crate::league::League;
use crate::r#match::{simulate_match, MatchResult, Referee};
use crate::utils::GameRng;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CupRules {
    #[serde(default = "default_two_legged")]
    pub two_legged: bool,
    #[serde(default)]
    pub final_two_legged: bool,
}

fn default_two_legged() -> bool {
    true
}

impl Default for CupRules {
    fn default() -> Self {
        CupRules {
            two_legged: true,
            final_two_legged: false,
        }
    }
}

/// Knockout tournament state. Clubs are referenced by name; the league
/// resolves them when a round is played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CupState {
    #[serde(default)]
    pub rules: CupRules,
    /// Clubs still alive, i.e. the entrants of the NEXT round.
    #[serde(default)]
    pub current_clubs: Vec<String>,
    /// Rounds already played.
    #[serde(default)]
    pub round_index: u32,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub winner: Option<String>,
}

/// Builds the opening state, padding the field up to the next power of two
/// by re-entering the leading clubs. A club meeting its own duplicate is a
/// walkover, which realises each bye without a sentinel entry.
pub fn create_cup_state(entrants: &[String], rules: CupRules) -> CupState {
    let count = entrants.len();
    let mut power = 1;
    while power < count {
        power *= 2;
    }
    let byes = power - count;

    let mut current: Vec<String> = entrants.to_vec();
    current.extend(entrants.iter().take(byes).cloned());

    let finished = current.len() <= 1;
    let winner = if current.len() == 1 {
        current.first().cloned()
    } else {
        None
    };

    CupState {
        rules,
        current_clubs: current,
        round_index: 0,
        finished,
        winner,
    }
}

fn play_single_leg(
    home: &Club,
    away: &Club,
    referee: &Referee,
    rng: &mut GameRng,
) -> (MatchResult, bool) {
    let result = simulate_match(
        home,
        away,
        referee,
        &home.tactic,
        &away.tactic,
        home.aggressiveness,
        away.aggressiveness,
        rng,
    );
    let home_won = if result.home_goals() != result.away_goals() {
        result.is_home_win()
    } else {
        // Drawn single-header: coin flip decides who goes through.
        rng.chance(0.5)
    };
    (result, home_won)
}

fn play_two_legged_tie(
    first_host: &Club,
    second_host: &Club,
    referee: &Referee,
    rng: &mut GameRng,
) -> (Vec<MatchResult>, bool) {
    let leg1 = simulate_match(
        first_host,
        second_host,
        referee,
        &first_host.tactic,
        &second_host.tactic,
        first_host.aggressiveness,
        second_host.aggressiveness,
        rng,
    );
    let leg2 = simulate_match(
        second_host,
        first_host,
        referee,
        &second_host.tactic,
        &first_host.tactic,
        second_host.aggressiveness,
        first_host.aggressiveness,
        rng,
    );

    let aggregate_first = leg1.home_goals() as u32 + leg2.away_goals() as u32;
    let aggregate_second = leg1.away_goals() as u32 + leg2.home_goals() as u32;
    let first_advances = if aggregate_first != aggregate_second {
        aggregate_first > aggregate_second
    } else {
        rng.chance(0.5)
    };
    (vec![leg1, leg2], first_advances)
}

/// Plays one cup round in place and returns the leg results.
pub fn advance_cup_round(
    state: &mut CupState,
    league: &League,
    referee: &Referee,
    rng: &mut GameRng,
) -> Vec<MatchResult> {
    if state.finished || state.current_clubs.len() <= 1 {
        state.finished = true;
        state.winner = state.current_clubs.first().cloned();
        return Vec::new();
    }

    let clubs = state.current_clubs.clone();
    let mut pairs: Vec<(String, Option<String>)> = clubs
        .iter()
        .cloned()
        .tuples()
        .map(|(a, b)| (a, Some(b)))
        .collect();
    if clubs.len() % 2 == 1 {
        pairs.push((clubs[clubs.len() - 1].clone(), None));
    }

    let is_final = pairs.len() == 1;
    let legs = if is_final && !state.rules.final_two_legged {
        1
    } else if state.rules.two_legged {
        2
    } else {
        1
    };

    let mut results: Vec<MatchResult> = Vec::new();
    let mut winners: Vec<String> = Vec::new();

    for (first, second) in pairs {
        let Some(second) = second else {
            winners.push(first);
            continue;
        };
        if first == second {
            // Bye realised as a walkover against the club's own duplicate.
            debug!("cup: {} advances on walkover", first);
            winners.push(first);
            continue;
        }

        let (Some(first_club), Some(second_club)) =
            (league.club_by_name(&first), league.club_by_name(&second))
        else {
            warn!("cup: pairing {} - {} has a missing club", first, second);
            if league.club_by_name(&first).is_some() {
                winners.push(first);
            } else if league.club_by_name(&second).is_some() {
                winners.push(second);
            }
            continue;
        };

        if legs == 1 {
            let (result, home_won) = play_single_leg(first_club, second_club, referee, rng);
            winners.push(if home_won { first.clone() } else { second.clone() });
            results.push(result);
        } else {
            let (tie_results, first_advances) =
                play_two_legged_tie(first_club, second_club, referee, rng);
            winners.push(if first_advances {
                first.clone()
            } else {
                second.clone()
            });
            results.extend(tie_results);
        }
    }

    state.round_index += 1;
    state.current_clubs = winners;
    if state.current_clubs.len() == 1 {
        state.finished = true;
        state.winner = state.current_clubs.first().cloned();
    }
    results
}

/// Plays the tournament to completion, returning the results per round.
pub fn finish_cup(
    state: &mut CupState,
    league: &League,
    referee: &Referee,
    rng: &mut GameRng,
) -> Vec<Vec<MatchResult>> {
    let mut rounds = Vec::new();
    while !state.finished {
        rounds.push(advance_cup_round(state, league, referee, rng));
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::{Player, Position};
    use crate::league::{Division, LeagueRules};

    fn make_club(name: &str, start_id: u32) -> Club {
        let mut club = Club::new(name);
        let mut id = start_id;
        for (position, count) in [
            (Position::GK, 2),
            (Position::DF, 4),
            (Position::MF, 4),
            (Position::FW, 3),
        ] {
            for _ in 0..count {
                club.players.push(Player {
                    id,
                    first_name: format!("P{id}"),
                    last_name: "Test".into(),
                    age: 24,
                    position,
                    number: (id % 98) as u8 + 1,
                    skill_open: 6,
                    skill_hidden: 50,
                    form_now: 10,
                    form_season: 10.0,
                    traits: vec![],
                    value_sek: 0,
                });
                id += 1;
            }
        }
        club
    }

    fn league_with(names: &[&str]) -> League {
        let mut division = Division::new("Division 1", 1);
        for (i, name) in names.iter().enumerate() {
            division.clubs.push(make_club(name, (i as u32 + 1) * 100));
        }
        let mut league = League::new("Cupligan", LeagueRules::default());
        league.divisions.push(division);
        league
    }

    #[test]
    fn four_clubs_need_two_rounds_to_find_a_winner() {
        let names = ["Alfa", "Beta", "Ceres", "Delta"];
        let league = league_with(&names);
        let entrants: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mut state = create_cup_state(&entrants, CupRules::default());
        let mut rng = GameRng::seeded(42);

        let semis = advance_cup_round(&mut state, &league, &Referee::default(), &mut rng);
        assert_eq!(semis.len(), 4, "two-legged semifinals produce four legs");
        assert_eq!(state.current_clubs.len(), 2);
        assert!(!state.finished);

        let finals = advance_cup_round(&mut state, &league, &Referee::default(), &mut rng);
        assert_eq!(finals.len(), 1, "single-header final");
        assert!(state.finished);
        let winner = state.winner.clone().unwrap();
        assert!(names.contains(&winner.as_str()));
        assert_eq!(state.round_index, 2);
    }

    #[test]
    fn odd_field_pads_with_byes() {
        let names = ["Alfa", "Beta", "Ceres"];
        let league = league_with(&names);
        let entrants: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mut state = create_cup_state(&entrants, CupRules::default());
        assert_eq!(state.current_clubs.len(), 4);

        let mut rng = GameRng::seeded(7);
        let _ = finish_cup(&mut state, &league, &Referee::default(), &mut rng);
        assert!(state.finished);
        assert!(names.contains(&state.winner.clone().unwrap().as_str()));
    }

    #[test]
    fn single_entrant_is_champion_immediately() {
        let state = create_cup_state(&["Ensam".to_string()], CupRules::default());
        assert!(state.finished);
        assert_eq!(state.winner.as_deref(), Some("Ensam"));
    }

    #[test]
    fn single_legged_rules_play_one_match_per_tie() {
        let names = ["Alfa", "Beta", "Ceres", "Delta"];
        let league = league_with(&names);
        let entrants: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let rules = CupRules {
            two_legged: false,
            final_two_legged: false,
        };
        let mut state = create_cup_state(&entrants, rules);
        let mut rng = GameRng::seeded(3);

        let semis = advance_cup_round(&mut state, &league, &Referee::default(), &mut rng);
        assert_eq!(semis.len(), 2);
    }

    #[test]
    fn finish_runs_until_a_single_winner_remains() {
        let names = ["A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8"];
        let league = league_with(&names);
        let entrants: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mut state = create_cup_state(&entrants, CupRules::default());
        let mut rng = GameRng::seeded(11);

        let rounds = finish_cup(&mut state, &league, &Referee::default(), &mut rng);
        assert_eq!(rounds.len(), 3);
        assert!(state.finished);
        assert_eq!(state.current_clubs.len(), 1);
    }
}
