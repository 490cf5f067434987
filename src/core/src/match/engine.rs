use crate::club::{Aggressiveness, Club, Position, Tactic, Trait};
use crate::r#match::events::{MatchEvent, MatchEventKind};
use crate::r#match::lineup::{roll_injuries, schedule_substitutions, select_lineup, SideLineup};
use crate::r#match::ratings::{event_impacts, man_of_the_match, player_rating, unit_ratings};
use crate::r#match::referee::Referee;
use crate::r#match::result::{
    MatchAwards, MatchResult, RatingsByUnit, RefereeReport, TacticReport, TacticSnapshot, TeamStats,
};
use crate::utils::GameRng;
use log::debug;
use std::collections::{HashMap, HashSet};

const BASE_XG_HOME: f64 = 1.35;
const BASE_XG_AWAY: f64 = 1.15;
const HOME_BONUS: f64 = 0.12;
const SKILL_XG_WEIGHT: f64 = 0.18;
const KEEPER_XG_WEIGHT: f64 = 0.06;
const OFFSIDE_TRAP_DAMP: f64 = 0.94;
const XG_FLOOR: f64 = 0.2;
const XG_CEIL: f64 = 3.2;
const ASSIST_PROBABILITY: f64 = 0.60;
const SECOND_YELLOW_PROBABILITY: f64 = 0.08;

/// Simulates one match between two clubs. Total: always returns a result,
/// even when one side cannot field a team (all zeros in that case).
pub fn simulate_match(
    home: &Club,
    away: &Club,
    referee: &Referee,
    home_tactic: &Tactic,
    away_tactic: &Tactic,
    home_aggr: Aggressiveness,
    away_aggr: Aggressiveness,
    rng: &mut GameRng,
) -> MatchResult {
    debug!("play match: {} - {}", home.name, away.name);

    let referee = referee.resolved(&home.name, &away.name);
    let referee_report = RefereeReport {
        name: referee.name.clone(),
        skill: referee.skill,
        hardness: referee.hardness,
    };

    let (home_lineup, home_bench) = select_lineup(home);
    let (away_lineup, away_bench) = select_lineup(away);

    if home_lineup.is_empty() || away_lineup.is_empty() {
        debug!(
            "match: {} - {} could not field both teams, all-zero result",
            home.name, away.name
        );
        let mut result = MatchResult::goalless(&home.name, &away.name, referee_report);
        result.home_lineup = home_lineup;
        result.away_lineup = away_lineup;
        result.home_bench = home_bench;
        result.away_bench = away_bench;
        return result;
    }

    let home_injuries = roll_injuries(home, &home_lineup, rng);
    let away_injuries = roll_injuries(away, &away_lineup, rng);
    let home_side = schedule_substitutions(home, home_lineup, home_bench, &home_injuries);
    let away_side = schedule_substitutions(away, away_lineup, away_bench, &away_injuries);

    let home_avg = average_skill_of(home, &home_side.lineup);
    let away_avg = average_skill_of(away, &away_side.lineup);
    let home_keeper = keeper_skill(home, &home_side.lineup);
    let away_keeper = keeper_skill(away, &away_side.lineup);

    let home_captain = captain_in_xi(home, &home_side.lineup);
    let away_captain = captain_in_xi(away, &away_side.lineup);
    let home_uplift = captain_uplift(home, home_captain, home_avg);
    let away_uplift = captain_uplift(away, away_captain, away_avg);

    let home_xg = expected_goals(
        BASE_XG_HOME,
        HOME_BONUS,
        home_avg,
        away_avg,
        home_tactic,
        away_tactic,
        away_keeper,
        home_uplift,
    );
    let away_xg = expected_goals(
        BASE_XG_AWAY,
        0.0,
        away_avg,
        home_avg,
        away_tactic,
        home_tactic,
        home_keeper,
        away_uplift,
    );

    let mut home_events = home_side.events.clone();
    let mut away_events = away_side.events.clone();

    // Open-play goals from the Poisson draw.
    let home_open = rng.poisson(home_xg).min(10) as u8;
    let away_open = rng.poisson(away_xg).min(10) as u8;
    push_goal_events(home, &home_side, home_open, &mut home_events, rng);
    push_goal_events(away, &away_side, away_open, &mut away_events, rng);

    // Penalties on top of the open-play draw.
    let home_pen = simulate_penalty(
        home,
        &home_side,
        away_aggr,
        away_tactic,
        &referee,
        away_keeper,
        &mut home_events,
        rng,
    );
    let away_pen = simulate_penalty(
        away,
        &away_side,
        home_aggr,
        home_tactic,
        &referee,
        home_keeper,
        &mut away_events,
        rng,
    );

    let home_goals = home_open + home_pen.scored;
    let away_goals = away_open + away_pen.scored;

    // Shots, corners and possession are synthesised around the xG level.
    let home_shots = draw_shots(home_xg, home_goals, rng);
    let away_shots = draw_shots(away_xg, away_goals, rng);
    let home_shots_on = draw_shots_on(home_shots, home_goals, rng);
    let away_shots_on = draw_shots_on(away_shots, away_goals, rng);
    let home_saves = draw_saves(away_shots_on, away_goals, home_keeper);
    let away_saves = draw_saves(home_shots_on, home_goals, away_keeper);
    let home_corners = (home_shots as f64 * rng.uniform(0.15, 0.30)).round() as u8;
    let away_corners = (away_shots as f64 * rng.uniform(0.15, 0.30)).round() as u8;

    let total_shots = (home_shots + away_shots).max(1) as f64;
    let shot_share = (home_shots as f64 - away_shots as f64) / total_shots;
    let home_possession = (50.0 + 8.0 * (home_avg - away_avg) + 4.0 * shot_share)
        .round()
        .clamp(30.0, 70.0) as u8;
    let away_possession = 100 - home_possession;

    let home_offsides = draw_offsides(home, &home_side, &referee, &mut home_events, rng);
    let away_offsides = draw_offsides(away, &away_side, &referee, &mut away_events, rng);

    let home_discipline = simulate_discipline(
        home,
        &home_side,
        home_aggr,
        home_tactic,
        &referee,
        &mut home_events,
        rng,
    );
    let away_discipline = simulate_discipline(
        away,
        &away_side,
        away_aggr,
        away_tactic,
        &referee,
        &mut away_events,
        rng,
    );

    let halftime_home = halftime_goals(&home_events);
    let halftime_away = halftime_goals(&away_events);

    let mut events: Vec<MatchEvent> = Vec::with_capacity(home_events.len() + away_events.len());
    events.extend(home_events.iter().cloned());
    events.extend(away_events.iter().cloned());
    events.sort_by_key(|event| event.minute);

    // Ratings for everyone who saw minutes.
    let impacts = event_impacts(&events);
    let mut ratings: HashMap<u32, f32> = HashMap::new();
    let home_participants = home_side.participants();
    let away_participants = away_side.participants();
    for pid in &home_participants {
        let minutes = home_side.minutes.get(pid).copied().unwrap_or(0);
        let impact = impacts.get(pid).copied().unwrap_or_default();
        let rating = player_rating(home, *pid, minutes, impact, home_captain == Some(*pid), rng);
        ratings.insert(*pid, rating);
    }
    for pid in &away_participants {
        let minutes = away_side.minutes.get(pid).copied().unwrap_or(0);
        let impact = impacts.get(pid).copied().unwrap_or_default();
        let rating = player_rating(away, *pid, minutes, impact, away_captain == Some(*pid), rng);
        ratings.insert(*pid, rating);
    }

    let awards = MatchAwards {
        mom_home: man_of_the_match(&ratings, &impacts, &home_side.minutes, &home_participants),
        mom_away: man_of_the_match(&ratings, &impacts, &away_side.minutes, &away_participants),
    };

    let ratings_by_unit = RatingsByUnit {
        home: unit_ratings(home, &ratings, &home_participants),
        away: unit_ratings(away, &ratings, &away_participants),
    };

    let home_positions = xi_positions(home, &home_side.lineup);
    let away_positions = xi_positions(away, &away_side.lineup);
    let tactic_report = TacticReport {
        home: TacticSnapshot::for_club(home, &home_positions),
        away: TacticSnapshot::for_club(away, &away_positions),
    };
    let formation_home = tactic_report.home.formation.clone();
    let formation_away = tactic_report.away.formation.clone();

    MatchResult {
        home: home.name.clone(),
        away: away.name.clone(),
        home_stats: TeamStats {
            goals: home_goals,
            shots: home_shots,
            shots_on: home_shots_on,
            saves: home_saves,
            corners: home_corners,
            fouls: home_discipline.fouls,
            offsides: home_offsides,
            yellows: home_discipline.yellows,
            reds: home_discipline.reds,
            penalties: home_pen.attempts,
            possession_pct: home_possession,
        },
        away_stats: TeamStats {
            goals: away_goals,
            shots: away_shots,
            shots_on: away_shots_on,
            saves: away_saves,
            corners: away_corners,
            fouls: away_discipline.fouls,
            offsides: away_offsides,
            yellows: away_discipline.yellows,
            reds: away_discipline.reds,
            penalties: away_pen.attempts,
            possession_pct: away_possession,
        },
        halftime_home,
        halftime_away,
        events,
        ratings,
        home_lineup: home_side.lineup.clone(),
        away_lineup: away_side.lineup.clone(),
        home_bench: home_side.bench.clone(),
        away_bench: away_side.bench.clone(),
        home_minutes: home_side.minutes.clone(),
        away_minutes: away_side.minutes.clone(),
        formation_home,
        formation_away,
        ratings_by_unit,
        tactic_report,
        awards,
        referee: referee_report,
        dark_arts_home: home_tactic.dark_arts,
        dark_arts_away: away_tactic.dark_arts,
    }
}

fn average_skill_of(club: &Club, ids: &[u32]) -> f64 {
    let skills: Vec<f64> = ids
        .iter()
        .filter_map(|pid| club.player(*pid))
        .map(|p| p.skill_open as f64)
        .collect();
    if skills.is_empty() {
        5.0
    } else {
        skills.iter().sum::<f64>() / skills.len() as f64
    }
}

fn keeper_skill(club: &Club, lineup: &[u32]) -> f64 {
    lineup
        .iter()
        .filter_map(|pid| club.player(*pid))
        .find(|p| p.position == Position::GK)
        .map(|p| p.skill_open as f64)
        .unwrap_or(5.0)
}

fn captain_in_xi(club: &Club, lineup: &[u32]) -> Option<u32> {
    club.captain_id.filter(|id| lineup.contains(id))
}

/// Team-wide offensive uplift from a present captain, proportional to how
/// much the captain stands out from the XI. Clamped to [0, 0.06].
fn captain_uplift(club: &Club, captain: Option<u32>, xi_avg: f64) -> f64 {
    let Some(captain) = captain.and_then(|id| club.player(id)) else {
        return 0.0;
    };
    let standout = captain.skill_open as f64 - xi_avg;
    (0.01 + 0.01 * standout).clamp(0.0, 0.06)
}

#[allow(clippy::too_many_arguments)]
fn expected_goals(
    base: f64,
    home_bonus: f64,
    own_avg: f64,
    opp_avg: f64,
    own_tactic: &Tactic,
    opp_tactic: &Tactic,
    opp_keeper: f64,
    captain_uplift: f64,
) -> f64 {
    let tactic_offset = if own_tactic.attacking {
        0.10
    } else if own_tactic.defending {
        -0.05
    } else {
        0.0
    };
    let keeper_effect = -KEEPER_XG_WEIGHT * (opp_keeper - 5.0);

    let mut xg = base + SKILL_XG_WEIGHT * (own_avg - opp_avg) + home_bonus + tactic_offset + keeper_effect;
    xg *= own_tactic.tempo as f64;
    if opp_tactic.offside_trap {
        xg *= OFFSIDE_TRAP_DAMP;
    }
    xg *= 1.0 + captain_uplift.min(0.06);
    xg.clamp(XG_FLOOR, XG_CEIL)
}

fn on_pitch_players<'c>(club: &'c Club, side: &SideLineup, minute: u8) -> Vec<&'c crate::club::Player> {
    side.on_pitch_at(minute)
        .into_iter()
        .filter_map(|pid| club.player(pid))
        .collect()
}

fn scorer_weight(player: &crate::club::Player) -> f64 {
    let position_weight = match player.position {
        Position::FW => 6.0,
        Position::MF => 3.0,
        Position::DF => 1.5,
        Position::GK => 0.3,
    };
    let mut weight = position_weight * (0.8 + 0.02 * player.skill_open as f64);
    if player.has_trait(Trait::PenaltySpec) {
        weight *= 1.15;
    }
    weight
}

fn push_goal_events(
    club: &Club,
    side: &SideLineup,
    goals: u8,
    events: &mut Vec<MatchEvent>,
    rng: &mut GameRng,
) {
    let minutes = rng.sample_distinct(1, 90, goals as usize);
    for minute in minutes {
        let minute = minute as u8;
        let on_pitch = on_pitch_players(club, side, minute);
        let Some(scorer) = rng.pick_weighted(&on_pitch, |p| scorer_weight(p)).map(|p| p.id) else {
            continue;
        };

        let assist = if rng.chance(ASSIST_PROBABILITY) {
            let others: Vec<&crate::club::Player> =
                on_pitch.iter().copied().filter(|p| p.id != scorer).collect();
            rng.pick_weighted(&others, |p| {
                let position_weight = match p.position {
                    Position::MF => 3.0,
                    Position::FW => 2.0,
                    Position::DF => 1.0,
                    Position::GK => 0.2,
                };
                if p.has_trait(Trait::Intelligent) {
                    position_weight * 1.10
                } else {
                    position_weight
                }
            })
            .map(|p| p.id)
        } else {
            None
        };

        events.push(MatchEvent::new(minute, MatchEventKind::Goal, Some(scorer)).with_assist(assist));
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PenaltyOutcome {
    attempts: u8,
    scored: u8,
}

#[allow(clippy::too_many_arguments)]
fn simulate_penalty(
    club: &Club,
    side: &SideLineup,
    opponent_aggr: Aggressiveness,
    opponent_tactic: &Tactic,
    referee: &Referee,
    opponent_keeper: f64,
    events: &mut Vec<MatchEvent>,
    rng: &mut GameRng,
) -> PenaltyOutcome {
    let mut probability = 0.09 * (1.0 + 0.1 * opponent_aggr.card_factor());
    probability *= 1.0 + 0.05 * ((referee.skill as f64 - 5.0) / 5.0);
    probability *= 1.0 + 0.04 * ((referee.hardness as f64 - 5.0) / 5.0);
    if opponent_tactic.dark_arts {
        probability *= 1.10;
    }
    probability = probability.clamp(0.03, 0.30);

    if !rng.chance(probability) {
        return PenaltyOutcome::default();
    }

    let minute = rng.int(1, 90) as u8;
    let on_pitch = on_pitch_players(club, side, minute);
    let taker = on_pitch
        .iter()
        .find(|p| p.has_trait(Trait::PenaltySpec))
        .map(|p| p.id)
        .or_else(|| rng.pick_weighted(&on_pitch, |p| scorer_weight(p)).map(|p| p.id));
    let Some(taker) = taker else {
        return PenaltyOutcome::default();
    };

    let conversion = 0.74 - 0.02 * (opponent_keeper - 5.0);
    if rng.chance(conversion) {
        events.push(MatchEvent::new(minute, MatchEventKind::PenaltyScored, Some(taker)));
        PenaltyOutcome {
            attempts: 1,
            scored: 1,
        }
    } else {
        events.push(MatchEvent::new(minute, MatchEventKind::PenaltyMissed, Some(taker)));
        PenaltyOutcome {
            attempts: 1,
            scored: 0,
        }
    }
}

fn draw_shots(xg: f64, goals: u8, rng: &mut GameRng) -> u8 {
    let raw = rng.gauss(10.0 + 2.0 * (xg - 1.0), 3.0).round() as i64;
    raw.clamp(goals.max(1) as i64, 25) as u8
}

fn draw_shots_on(shots: u8, goals: u8, rng: &mut GameRng) -> u8 {
    let raw = (shots as f64 * rng.uniform(0.35, 0.55)).round() as i64;
    raw.clamp(goals as i64, shots as i64) as u8
}

fn draw_saves(opponent_shots_on: u8, opponent_goals: u8, keeper: f64) -> u8 {
    let stoppable = opponent_shots_on.saturating_sub(opponent_goals) as f64;
    let share = (0.7 + 0.03 * (keeper - 5.0)).clamp(0.4, 1.0);
    (stoppable * share).round() as u8
}

fn draw_offsides(
    club: &Club,
    side: &SideLineup,
    referee: &Referee,
    events: &mut Vec<MatchEvent>,
    rng: &mut GameRng,
) -> u8 {
    let raw = rng.gauss(2.2, 1.1) * referee.detection_factor();
    let count = raw.round().clamp(0.0, 8.0) as u8;
    for _ in 0..count {
        let minute = rng.int(1, 90) as u8;
        let on_pitch = on_pitch_players(club, side, minute);
        let caught = rng.pick_weighted(&on_pitch, |p| match p.position {
            Position::FW => 3.0,
            Position::MF => 1.0,
            _ => 0.2,
        });
        if let Some(player) = caught {
            events.push(MatchEvent::new(minute, MatchEventKind::Offside, Some(player.id)));
        }
    }
    count
}

#[derive(Debug, Default, Clone, Copy)]
struct DisciplineOutcome {
    fouls: u8,
    yellows: u8,
    reds: u8,
}

fn simulate_discipline(
    club: &Club,
    side: &SideLineup,
    aggressiveness: Aggressiveness,
    tactic: &Tactic,
    referee: &Referee,
    events: &mut Vec<MatchEvent>,
    rng: &mut GameRng,
) -> DisciplineOutcome {
    let aggr_factor = aggressiveness.card_factor();
    let mut detection = referee.detection_factor();

    let mut raw_fouls = rng.gauss(10.0, 3.0).max(0.0) * aggr_factor;
    if tactic.dark_arts {
        // Dark arts draw more fouls but hide some of them, unless the
        // official cracks down.
        raw_fouls *= rng.uniform(1.12, 1.22);
        let stealth = 0.85;
        let crackdown = 1.0 + 0.05 * ((referee.hardness as f64 - 5.0) / 5.0);
        detection *= stealth * crackdown;
    }
    let fouls = (raw_fouls * detection).round().clamp(0.0, 30.0) as u8;

    let mut yellow_probability = 0.10 * aggr_factor * (1.0 + 0.06 * (referee.hardness as f64 - 5.0));
    yellow_probability *= 1.0 + 0.05 * ((referee.skill as f64 - 5.0) / 5.0);
    if tactic.dark_arts {
        yellow_probability *= 1.10;
    }
    let yellow_probability = yellow_probability.clamp(0.0, 0.5);

    let mut booked: HashSet<u32> = HashSet::new();
    let mut yellows = 0u8;
    let mut reds = 0u8;

    for _ in 0..fouls {
        if !rng.chance(yellow_probability) {
            continue;
        }
        let minute = rng.int(1, 90) as u8;
        let on_pitch = on_pitch_players(club, side, minute);
        let target = rng.pick_weighted(&on_pitch, |p| {
            let mut weight = if p.position == Position::GK { 0.3 } else { 1.0 };
            if p.has_trait(Trait::Aggressive) {
                weight *= 1.6;
            }
            if p.has_trait(Trait::CardProne) {
                weight *= 1.6;
            }
            weight
        });
        let Some(target) = target.map(|p| p.id) else {
            continue;
        };

        if booked.contains(&target) {
            yellows += 1;
            reds += 1;
            events.push(MatchEvent::new(minute, MatchEventKind::Yellow, Some(target)));
            events.push(
                MatchEvent::new(minute, MatchEventKind::Red, Some(target)).with_note("second yellow"),
            );
        } else {
            booked.insert(target);
            yellows += 1;
            events.push(MatchEvent::new(minute, MatchEventKind::Yellow, Some(target)));
            if rng.chance(SECOND_YELLOW_PROBABILITY) {
                let later = (minute as i64 + rng.int(1, 15)).min(90) as u8;
                reds += 1;
                events.push(
                    MatchEvent::new(later, MatchEventKind::Red, Some(target))
                        .with_note("second yellow"),
                );
            }
        }
    }

    DisciplineOutcome {
        fouls,
        yellows,
        reds,
    }
}

fn halftime_goals(events: &[MatchEvent]) -> u8 {
    events
        .iter()
        .filter(|event| event.kind.is_goal() && event.minute <= 45)
        .count() as u8
}

fn xi_positions(club: &Club, lineup: &[u32]) -> Vec<Position> {
    lineup
        .iter()
        .filter_map(|pid| club.player(*pid))
        .map(|p| p.position)
        .collect()
}
