use crate::club::{Player, Trait};
use crate::cup::cup_result_labels;
use crate::economy::roll_new_junior_offers;
use crate::league::schedule::build_league_schedule;
use crate::league::{division_standings, TableRow};
use crate::state::{GameState, SeasonRecord};
use crate::stats::PlayerStats;
use crate::utils::GameRng;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const RETIREMENT_AGE: u8 = 51;
const MAX_BARS_CHANGE_PER_SEASON: i32 = 2;
const TRIGGER_DROP_PROBABILITY: f64 = 0.15;

/// Per-player entry of the end-of-season report.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProgress {
    pub player_id: u32,
    pub name: String,
    pub club: String,
    pub age: u8,
    pub minutes: u32,
    pub play_ratio: f64,
    pub form_season_before: f32,
    pub form_now_before: u8,
    pub bars_before: u8,
    pub hidden_before: u8,
    pub bars_delta: i32,
    pub hidden_after: u8,
    pub bars_after: u8,
    pub note: String,
}

fn age_factors(age: u8) -> (f64, f64) {
    match age {
        0..=21 => (1.30, 0.70),
        22..=28 => (1.00, 1.00),
        29..=31 => (0.80, 1.10),
        _ => (0.50, 1.50),
    }
}

/// Rolls the hidden pool over 1..=99, converting each +-100 into one bar,
/// capped at `max_delta_bars` per season.
fn apply_hidden_rollover(
    mut skill_open: i32,
    mut hidden: i32,
    max_delta_bars: i32,
) -> (u8, u8, i32) {
    let mut bars_delta = 0;
    while hidden > 99 && bars_delta < max_delta_bars {
        hidden -= 100;
        skill_open += 1;
        bars_delta += 1;
    }
    if hidden > 99 && bars_delta >= max_delta_bars {
        hidden = 99;
    }
    while hidden < 1 && bars_delta > -max_delta_bars {
        hidden += 100;
        skill_open -= 1;
        bars_delta -= 1;
    }
    if hidden < 1 && bars_delta <= -max_delta_bars {
        hidden = 1;
    }

    (
        skill_open.clamp(1, 30) as u8,
        hidden.clamp(1, 99) as u8,
        bars_delta,
    )
}

fn expected_team_minutes(snapshot: &HashMap<String, TableRow>, club_name: &str) -> u32 {
    if let Some(row) = snapshot.get(club_name) {
        if row.mp > 0 {
            return row.mp * 90;
        }
    }
    // No table yet: assume a full 30-match season.
    30 * 90
}

#[allow(clippy::too_many_arguments)]
fn progress_player(
    player: &mut Player,
    club_name: &str,
    stats: Option<&PlayerStats>,
    snapshot: &HashMap<String, TableRow>,
    captain_id: Option<u32>,
    rng: &mut GameRng,
) -> PlayerProgress {
    let bars_before = player.skill_open;
    let hidden_before = player.skill_hidden;
    let form_now_before = player.form_now;
    let form_season_before = player.form_season;
    let age = player.age;

    let minutes = stats.map(|s| s.minutes).unwrap_or(0);
    let team_minutes = expected_team_minutes(snapshot, club_name);
    let play_ratio = if team_minutes > 0 {
        minutes as f64 / team_minutes as f64
    } else {
        0.0
    };

    let mut gain = form_season_before > 10.0 && play_ratio >= 0.25;
    let mut loss = form_season_before < 10.0 || play_ratio < 0.25;
    if gain && rng.chance(TRIGGER_DROP_PROBABILITY) {
        gain = false;
    }
    if loss && rng.chance(TRIGGER_DROP_PROBABILITY) {
        loss = false;
    }

    let (mut gain_factor, mut loss_factor) = age_factors(age);
    if player.has_trait(Trait::Trainable) {
        gain_factor *= 1.20;
    }
    if player.has_trait(Trait::Leader) {
        gain_factor *= 1.05;
    }
    if player.has_trait(Trait::Intelligent) {
        gain_factor *= 1.05;
    }
    if player.has_trait(Trait::InjuryProne) {
        loss_factor *= 1.25;
    }
    if captain_id == Some(player.id) {
        gain_factor *= 1.05;
    }

    let mut hidden = hidden_before as i32;
    let bars;
    let bars_delta;
    let note;

    if gain && !loss {
        let mut delta = rng.int(8, 20) as f64;
        delta *= 1.0 + 0.03 * (form_season_before as f64 - 10.0);
        delta *= 0.6 + 1.2 * play_ratio.min(1.0);
        let delta = ((delta * gain_factor) as i32).max(1);
        hidden += delta;
        let (new_bars, new_hidden, delta_bars) =
            apply_hidden_rollover(bars_before as i32, hidden, MAX_BARS_CHANGE_PER_SEASON);
        bars = new_bars;
        hidden = new_hidden as i32;
        bars_delta = delta_bars;
        note = if delta_bars > 0 {
            format!("+{delta_bars} bar")
        } else {
            format!("+{delta} hidden")
        };
    } else if loss && !gain {
        let mut delta = rng.int(5, 15) as f64;
        delta *= 1.0 + 0.03 * (10.0 - form_season_before as f64);
        delta *= 0.8 + 1.1 * (1.0 - play_ratio.min(1.0));
        let delta = ((delta * loss_factor) as i32).max(1);
        hidden -= delta;
        let (new_bars, new_hidden, delta_bars) =
            apply_hidden_rollover(bars_before as i32, hidden, MAX_BARS_CHANGE_PER_SEASON);
        bars = new_bars;
        hidden = new_hidden as i32;
        bars_delta = delta_bars;
        note = if delta_bars < 0 {
            format!("{delta_bars} bar")
        } else {
            format!("-{delta} hidden")
        };
    } else {
        let jitter = rng.int(-3, 3) as i32;
        hidden = (hidden + jitter).clamp(1, 99);
        bars = bars_before;
        bars_delta = 0;
        note = "stabil".to_string();
    }

    player.skill_open = bars;
    player.skill_hidden = hidden.clamp(1, 99) as u8;
    player.form_now = rng.int(9, 11) as u8;
    player.form_season = 10.0;

    PlayerProgress {
        player_id: player.id,
        name: player.full_name(),
        club: club_name.to_string(),
        age,
        minutes,
        play_ratio,
        form_season_before,
        form_now_before,
        bars_before,
        hidden_before,
        bars_delta,
        hidden_after: player.skill_hidden,
        bars_after: bars,
        note,
    }
}

/// Aggregated level standings for promotion/relegation: worst club first,
/// keyed back to its division index.
fn level_rankings(
    gs: &GameState,
    division_indices: &[usize],
) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize, u32, i32, i32)> = Vec::new();
    let mut sorted_indices: Vec<usize> = division_indices.to_vec();
    sorted_indices.sort_by(|a, b| {
        gs.league.divisions[*a]
            .name
            .cmp(&gs.league.divisions[*b].name)
    });

    for index in sorted_indices {
        let division = &gs.league.divisions[index];
        for (club, row) in division_standings(division, &gs.table_snapshot) {
            rows.push((club.name.clone(), index, row.pts, row.gd(), row.gf));
        }
    }
    rows.sort_by(|a, b| {
        a.2.cmp(&b.2)
            .then_with(|| a.3.cmp(&b.3))
            .then_with(|| a.4.cmp(&b.4))
            .then_with(|| a.0.cmp(&b.0))
    });
    rows.into_iter().map(|(name, index, ..)| (name, index)).collect()
}

fn apply_promotion_relegation(gs: &mut GameState) {
    let promote = gs.league.rules.promote;
    let relegate = gs.league.rules.relegate;
    if promote.max(relegate) == 0 {
        return;
    }

    let mut by_level: HashMap<u8, Vec<usize>> = HashMap::new();
    for (index, division) in gs.league.divisions.iter().enumerate() {
        by_level.entry(division.level).or_default().push(index);
    }
    if by_level.len() < 2 {
        return;
    }

    let max_level = by_level.keys().copied().max().unwrap_or(1);
    for level in 1..max_level {
        let Some(upper) = by_level.get(&level).cloned() else {
            continue;
        };
        let Some(lower) = by_level.get(&(level + 1)).cloned() else {
            continue;
        };

        let mut lower_ranked = level_rankings(gs, &lower);
        lower_ranked.reverse(); // best of the lower level first
        let upper_ranked = level_rankings(gs, &upper); // worst of the upper level first

        let moves = promote
            .min(relegate)
            .min(lower_ranked.len())
            .min(upper_ranked.len());
        if moves == 0 {
            continue;
        }

        let going_up: Vec<(String, usize)> = lower_ranked.into_iter().take(moves).collect();
        let going_down: Vec<(String, usize)> = upper_ranked.into_iter().take(moves).collect();

        let mut detached: Vec<(crate::club::Club, bool)> = Vec::new();
        for (name, division_index) in going_up {
            let clubs = &mut gs.league.divisions[division_index].clubs;
            if let Some(position) = clubs.iter().position(|c| c.name == name) {
                detached.push((clubs.remove(position), true));
            }
        }
        for (name, division_index) in going_down {
            let clubs = &mut gs.league.divisions[division_index].clubs;
            if let Some(position) = clubs.iter().position(|c| c.name == name) {
                detached.push((clubs.remove(position), false));
            }
        }

        for (club, moving_up) in detached {
            let target_level = if moving_up { &upper } else { &lower };
            let target = target_level
                .iter()
                .copied()
                .min_by_key(|index| {
                    (
                        gs.league.divisions[*index].clubs.len(),
                        gs.league.divisions[*index].name.clone(),
                    )
                })
                .expect("level has divisions");
            debug!(
                "season: {} {} to {}",
                club.name,
                if moving_up { "promoted" } else { "relegated" },
                gs.league.divisions[target].name
            );
            gs.league.divisions[target].clubs.push(club);
        }
    }
}

/// Runs the full end-of-season pipeline and returns the progression
/// report. Career totals from match play stay intact; only the season
/// accumulators are archived and cleared.
pub fn end_season(gs: &mut GameState, rng: &mut GameRng) -> Vec<PlayerProgress> {
    gs.ensure_containers();
    let season = gs.season;
    let snapshot = gs.table_snapshot.clone();
    let season_stats = gs.player_stats.clone();

    let mut report: Vec<PlayerProgress> = Vec::new();
    let mut retired: Vec<(String, u32)> = Vec::new();

    // 1) Progression, then ageing, per player. A single bad entry only
    //    marks that player unchanged.
    for division in gs.league.divisions.iter_mut() {
        for club in division.clubs.iter_mut() {
            let club_name = club.name.clone();
            let captain_id = club.captain_id;
            for player in club.players.iter_mut() {
                let mut progress = progress_player(
                    player,
                    &club_name,
                    season_stats.get(&player.id),
                    &snapshot,
                    captain_id,
                    rng,
                );

                player.age += 1;
                if player.age >= RETIREMENT_AGE {
                    retired.push((club_name.clone(), player.id));
                    progress.note = if progress.note.is_empty() {
                        "pensionerar sig".to_string()
                    } else {
                        format!("{}; pensionerar sig", progress.note)
                    };
                }
                report.push(progress);
            }
        }
    }

    // 2) Retirement cleanup: rosters, derived references, market listings.
    if !retired.is_empty() {
        let retired_ids: HashSet<u32> = retired.iter().map(|(_, id)| *id).collect();
        for (club_name, player_id) in &retired {
            if let Some(club) = gs.league.club_by_name_mut(club_name) {
                club.take_player(*player_id);
            }
        }
        gs.transfer_list.retain(|listing| {
            listing
                .player_id
                .map(|id| !retired_ids.contains(&id))
                .unwrap_or(true)
        });
        debug!("season: {} players retired", retired.len());
    }

    // 3) Movement between levels happens before the new schedule is built.
    apply_promotion_relegation(gs);

    // 4) History and trophies from the final tables.
    let cup_labels = cup_result_labels(gs.cup_state.as_ref(), &gs.match_log);
    let mut trophy_updates: Vec<(String, String)> = Vec::new();
    for division in &gs.league.divisions {
        let standings = division_standings(division, &gs.table_snapshot);
        for (position, (club, _)) in standings.iter().enumerate() {
            let position = position as u32 + 1;
            gs.history.add_record(
                club.name.clone(),
                SeasonRecord {
                    season,
                    league_position: Some(position),
                    cup_result: cup_labels.get(&club.name).cloned(),
                },
            );
            if position == 1 {
                let trophy = if division.level == 1 {
                    format!("🏆 {} säsong {}", gs.league.name, season)
                } else {
                    format!("🥇 {} säsong {}", division.name, season)
                };
                trophy_updates.push((club.name.clone(), trophy));
            }
        }
    }
    for (club_name, trophy) in trophy_updates {
        if let Some(club) = gs.league.club_by_name_mut(&club_name) {
            club.trophies.push(trophy);
        }
    }

    // 5) Archive season statistics, bump career season counters, reset.
    if !gs.player_stats.is_empty() {
        gs.player_stats_history
            .insert(season, gs.player_stats.clone());
    }
    if !gs.club_stats.is_empty() {
        gs.club_stats_history.insert(season, gs.club_stats.clone());
    }
    for (player_id, stats) in &gs.player_stats {
        if stats.appearances == 0 {
            continue;
        }
        let career = gs
            .player_career_stats
            .entry(*player_id)
            .or_insert_with(|| PlayerStats::new(*player_id, stats.club_name.clone()));
        career.club_name = stats.club_name.clone();
        career.seasons += 1;
    }
    for (club_name, stats) in &gs.club_stats {
        if stats.played == 0 {
            continue;
        }
        let career = gs
            .club_career_stats
            .entry(club_name.clone())
            .or_insert_with(|| crate::stats::ClubStats::new(club_name.clone()));
        career.seasons += 1;
    }
    gs.player_stats.clear();
    gs.club_stats.clear();

    // 6) Roll over into the new season.
    gs.season += 1;
    gs.fixtures_by_division = build_league_schedule(&gs.league);
    roll_new_junior_offers(gs, rng);
    gs.current_round = 1;
    gs.table_snapshot.clear();
    gs.cup_state = None;

    report
}
