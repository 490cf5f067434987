use crate::club::{Club, Position};
use crate::league::{League, TableRow};
use crate::r#match::{MatchEventKind, MatchResult, TeamStats};
use crate::stats::{ClubStats, Competition, MatchRecord, PlayerStats};
use std::collections::{HashMap, HashSet};

fn ensure_player<'s>(
    stats: &'s mut HashMap<u32, PlayerStats>,
    player_id: u32,
    club_name: &str,
) -> &'s mut PlayerStats {
    stats
        .entry(player_id)
        .or_insert_with(|| PlayerStats::new(player_id, club_name))
}

fn ensure_club<'s>(stats: &'s mut HashMap<String, ClubStats>, club_name: &str) -> &'s mut ClubStats {
    stats
        .entry(club_name.to_string())
        .or_insert_with(|| ClubStats::new(club_name))
}

fn fold_club_side(
    stats: &mut HashMap<String, ClubStats>,
    name: &str,
    own: &TeamStats,
    opp: &TeamStats,
) {
    let entry = ensure_club(stats, name);
    entry.played += 1;
    entry.goals_for += own.goals as u32;
    entry.goals_against += opp.goals as u32;
    if own.goals > opp.goals {
        entry.wins += 1;
    } else if own.goals < opp.goals {
        entry.losses += 1;
    } else {
        entry.draws += 1;
    }
    if opp.goals == 0 {
        entry.clean_sheets += 1;
    }
    entry.yellows += own.yellows as u32;
    entry.reds += own.reds as u32;
    entry.shots += own.shots as u32;
    entry.shots_on += own.shots_on as u32;
    entry.shots_against += opp.shots as u32;
    entry.corners += own.corners as u32;
    entry.offsides += own.offsides as u32;
    entry.fouls += own.fouls as u32;
    entry.saves += own.saves as u32;
    entry.possession_for += own.possession_pct as u32;
    entry.possession_against += opp.possession_pct as u32;
}

fn unfold_club_side(
    stats: &mut HashMap<String, ClubStats>,
    name: &str,
    own: &TeamStats,
    opp: &TeamStats,
) {
    let entry = ensure_club(stats, name);
    entry.played = entry.played.saturating_sub(1);
    entry.goals_for = entry.goals_for.saturating_sub(own.goals as u32);
    entry.goals_against = entry.goals_against.saturating_sub(opp.goals as u32);
    if own.goals > opp.goals {
        entry.wins = entry.wins.saturating_sub(1);
    } else if own.goals < opp.goals {
        entry.losses = entry.losses.saturating_sub(1);
    } else {
        entry.draws = entry.draws.saturating_sub(1);
    }
    if opp.goals == 0 {
        entry.clean_sheets = entry.clean_sheets.saturating_sub(1);
    }
    entry.yellows = entry.yellows.saturating_sub(own.yellows as u32);
    entry.reds = entry.reds.saturating_sub(own.reds as u32);
    entry.shots = entry.shots.saturating_sub(own.shots as u32);
    entry.shots_on = entry.shots_on.saturating_sub(own.shots_on as u32);
    entry.shots_against = entry.shots_against.saturating_sub(opp.shots as u32);
    entry.corners = entry.corners.saturating_sub(own.corners as u32);
    entry.offsides = entry.offsides.saturating_sub(own.offsides as u32);
    entry.fouls = entry.fouls.saturating_sub(own.fouls as u32);
    entry.saves = entry.saves.saturating_sub(own.saves as u32);
    entry.possession_for = entry.possession_for.saturating_sub(own.possession_pct as u32);
    entry.possession_against = entry
        .possession_against
        .saturating_sub(opp.possession_pct as u32);
}

fn home_side_ids(record: &MatchRecord) -> HashSet<u32> {
    record
        .minutes_home
        .keys()
        .copied()
        .chain(record.lineup_home.iter().copied())
        .chain(record.bench_home.iter().copied())
        .collect()
}

fn route_player_event(entry: &mut PlayerStats, kind: MatchEventKind, forward: bool) {
    let bump = |counter: &mut u32| {
        if forward {
            *counter += 1;
        } else {
            *counter = counter.saturating_sub(1);
        }
    };
    match kind {
        MatchEventKind::Goal => bump(&mut entry.goals),
        MatchEventKind::PenaltyScored => {
            bump(&mut entry.goals);
            bump(&mut entry.penalties);
        }
        MatchEventKind::PenaltyMissed => bump(&mut entry.penalties),
        MatchEventKind::Yellow => bump(&mut entry.yellows),
        MatchEventKind::Red => bump(&mut entry.reds),
        MatchEventKind::Injury => bump(&mut entry.injuries),
        MatchEventKind::Offside => bump(&mut entry.offsides),
        MatchEventKind::Substitution => {}
    }
}

fn fold_record(
    record: &MatchRecord,
    home: &Club,
    away: &Club,
    player_stats: &mut HashMap<u32, PlayerStats>,
    club_stats: &mut HashMap<String, ClubStats>,
    forward: bool,
) {
    if forward {
        fold_club_side(club_stats, &record.home, &record.home_stats, &record.away_stats);
        fold_club_side(club_stats, &record.away, &record.away_stats, &record.home_stats);
    } else {
        unfold_club_side(club_stats, &record.home, &record.home_stats, &record.away_stats);
        unfold_club_side(club_stats, &record.away, &record.away_stats, &record.home_stats);
    }

    let home_ids = home_side_ids(record);
    let side_name = |player_id: u32| -> &str {
        if home_ids.contains(&player_id) {
            record.home.as_str()
        } else {
            record.away.as_str()
        }
    };

    // Appearances, minutes and goalkeeper clean sheets.
    let sides = [
        (&record.minutes_home, record.home.as_str(), home, record.away_stats.goals),
        (&record.minutes_away, record.away.as_str(), away, record.home_stats.goals),
    ];
    for (minutes_map, club_name, club, conceded) in sides {
        for (player_id, minutes) in minutes_map {
            if *minutes == 0 {
                continue;
            }
            let is_keeper = club
                .player(*player_id)
                .map(|p| p.position == Position::GK)
                .unwrap_or(false);
            let entry = ensure_player(player_stats, *player_id, club_name);
            if forward {
                entry.club_name = club_name.to_string();
                entry.appearances += 1;
                entry.minutes += *minutes as u32;
                if is_keeper && conceded == 0 {
                    entry.clean_sheets += 1;
                }
            } else {
                entry.appearances = entry.appearances.saturating_sub(1);
                entry.minutes = entry.minutes.saturating_sub(*minutes as u32);
                if is_keeper && conceded == 0 {
                    entry.clean_sheets = entry.clean_sheets.saturating_sub(1);
                }
            }
        }
    }

    // Event routing.
    for event in &record.events {
        if let Some(player_id) = event.player_id {
            let entry = ensure_player(player_stats, player_id, side_name(player_id));
            route_player_event(entry, event.kind, forward);
        }
        if event.kind == MatchEventKind::Goal {
            if let Some(assist_id) = event.assist_id {
                let entry = ensure_player(player_stats, assist_id, side_name(assist_id));
                if forward {
                    entry.assists += 1;
                } else {
                    entry.assists = entry.assists.saturating_sub(1);
                }
            }
        }
    }

    // Ratings.
    for (player_id, rating) in &record.ratings {
        if *rating <= 0.0 {
            continue;
        }
        let entry = ensure_player(player_stats, *player_id, side_name(*player_id));
        if forward {
            entry.rating_sum += *rating as f64;
            entry.rating_count += 1;
        } else {
            entry.rating_sum = (entry.rating_sum - *rating as f64).max(0.0);
            entry.rating_count = entry.rating_count.saturating_sub(1);
        }
    }
}

/// Folds one logged record into a player/club stat map pair.
pub fn apply_record_to_stats(
    record: &MatchRecord,
    home: &Club,
    away: &Club,
    player_stats: &mut HashMap<u32, PlayerStats>,
    club_stats: &mut HashMap<String, ClubStats>,
) {
    fold_record(record, home, away, player_stats, club_stats, true);
}

/// Exact inverse of `apply_record_to_stats`, for when a logged record is
/// removed or replaced. Counters saturate at zero so a drifted map can
/// never underflow.
pub fn remove_record_from_stats(
    record: &MatchRecord,
    home: &Club,
    away: &Club,
    player_stats: &mut HashMap<u32, PlayerStats>,
    club_stats: &mut HashMap<String, ClubStats>,
) {
    fold_record(record, home, away, player_stats, club_stats, false);
}

/// Folds one match result into the season AND career accumulators in a
/// single pass and returns the immutable log record.
#[allow(clippy::too_many_arguments)]
pub fn update_stats_from_result(
    result: &MatchResult,
    home: &Club,
    away: &Club,
    competition: Competition,
    season: u32,
    round: u32,
    player_stats: &mut HashMap<u32, PlayerStats>,
    club_stats: &mut HashMap<String, ClubStats>,
    player_career_stats: &mut HashMap<u32, PlayerStats>,
    club_career_stats: &mut HashMap<String, ClubStats>,
) -> MatchRecord {
    let record = MatchRecord::from_result(result, competition, season, round);
    apply_record_to_stats(&record, home, away, player_stats, club_stats);
    apply_record_to_stats(&record, home, away, player_career_stats, club_career_stats);
    record
}

fn resolve_club<'l>(league: &'l League, name: &str, fallback: &'l mut Option<Club>) -> &'l Club {
    match league.club_by_name(name) {
        Some(club) => club,
        None => fallback.insert(Club::new(name.to_string())),
    }
}

/// Rebuilds the season player/club stat maps from the match log, the
/// log being the source of truth. Only records of `season` count; the
/// career maps span seasons and are maintained by apply/remove deltas
/// instead.
pub fn rebuild_stats_from_log(
    match_log: &[MatchRecord],
    season: u32,
    league: &League,
) -> (HashMap<u32, PlayerStats>, HashMap<String, ClubStats>) {
    let mut player_stats = HashMap::new();
    let mut club_stats = HashMap::new();
    for record in match_log {
        if record.season != season {
            continue;
        }
        let mut fallback_home = None;
        let mut fallback_away = None;
        let home = resolve_club(league, &record.home, &mut fallback_home);
        let away = resolve_club(league, &record.away, &mut fallback_away);
        apply_record_to_stats(record, home, away, &mut player_stats, &mut club_stats);
    }
    (player_stats, club_stats)
}

/// Rebuilds the running league table from the match log: league games of
/// the given season only.
pub fn rebuild_table_snapshot(match_log: &[MatchRecord], season: u32) -> HashMap<String, TableRow> {
    let mut table: HashMap<String, TableRow> = HashMap::new();
    for record in match_log {
        if record.competition != Competition::League || record.season != season {
            continue;
        }
        table
            .entry(record.home.clone())
            .or_default()
            .apply(record.home_goals as u32, record.away_goals as u32);
        table
            .entry(record.away.clone())
            .or_default()
            .apply(record.away_goals as u32, record.home_goals as u32);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::Player;
    use crate::league::{Division, LeagueRules};
    use crate::r#match::MatchEvent;

    fn make_player(id: u32, position: Position) -> Player {
        Player {
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
        }
    }

    fn make_club(name: &str, start_id: u32) -> Club {
        let mut club = Club::new(name);
        let mut id = start_id;
        for (position, count) in [
            (Position::GK, 1),
            (Position::DF, 4),
            (Position::MF, 4),
            (Position::FW, 2),
        ] {
            for _ in 0..count {
                club.players.push(make_player(id, position));
                id += 1;
            }
        }
        club
    }

    fn result_between(home: &Club, away: &Club) -> MatchResult {
        let home_lineup: Vec<u32> = home.players.iter().map(|p| p.id).collect();
        let away_lineup: Vec<u32> = away.players.iter().map(|p| p.id).collect();
        let home_minutes: HashMap<u32, u8> = home_lineup.iter().map(|id| (*id, 90)).collect();
        let away_minutes: HashMap<u32, u8> = away_lineup.iter().map(|id| (*id, 90)).collect();

        let mut result = MatchResult::goalless(&home.name, &away.name, Default::default());
        result.home_lineup = home_lineup;
        result.away_lineup = away_lineup;
        result.home_minutes = home_minutes;
        result.away_minutes = away_minutes;
        result.home_stats = TeamStats {
            goals: 2,
            shots: 11,
            shots_on: 6,
            saves: 2,
            corners: 5,
            fouls: 9,
            offsides: 2,
            yellows: 1,
            reds: 0,
            penalties: 0,
            possession_pct: 62,
        };
        result.away_stats = TeamStats {
            goals: 0,
            shots: 5,
            shots_on: 2,
            saves: 4,
            corners: 1,
            fouls: 12,
            offsides: 1,
            yellows: 2,
            reds: 0,
            penalties: 0,
            possession_pct: 38,
        };
        let scorer = result.home_lineup[10];
        let assist = result.home_lineup[9];
        result.events = vec![
            MatchEvent::new(12, MatchEventKind::Goal, Some(scorer)).with_assist(Some(assist)),
            MatchEvent::new(80, MatchEventKind::Goal, Some(scorer)),
        ];
        result.ratings.insert(scorer, 8.4);
        result
    }

    fn league_with(home: Club, away: Club) -> League {
        let mut division = Division::new("Division 1", 1);
        division.clubs.push(home);
        division.clubs.push(away);
        let mut league = League::new("Testligan", LeagueRules::default());
        league.divisions.push(division);
        league
    }

    #[test]
    fn aggregator_updates_clubs_players_and_careers() {
        let home = make_club("Hemma", 1);
        let away = make_club("Borta", 100);
        let result = result_between(&home, &away);

        let mut player_stats = HashMap::new();
        let mut club_stats = HashMap::new();
        let mut player_career = HashMap::new();
        let mut club_career = HashMap::new();

        let record = update_stats_from_result(
            &result,
            &home,
            &away,
            Competition::League,
            1,
            1,
            &mut player_stats,
            &mut club_stats,
            &mut player_career,
            &mut club_career,
        );

        let home_cs = &club_stats["Hemma"];
        assert_eq!(home_cs.wins, 1);
        assert_eq!(home_cs.clean_sheets, 1);
        assert_eq!(home_cs.possession_for, 62);
        assert_eq!(home_cs.shots_against, 5);
        assert_eq!(club_stats["Borta"].losses, 1);
        assert_eq!(club_career["Hemma"].wins, 1);

        let home_gk = home.players[0].id;
        assert_eq!(player_stats[&home_gk].clean_sheets, 1);
        assert_eq!(player_career[&home_gk].clean_sheets, 1);
        let away_gk = away.players[0].id;
        assert_eq!(player_stats[&away_gk].clean_sheets, 0);

        let scorer = result.home_lineup[10];
        assert_eq!(player_stats[&scorer].goals, 2);
        assert_eq!(player_stats[&result.home_lineup[9]].assists, 1);
        assert_eq!(player_stats[&scorer].rating_count, 1);

        assert_eq!(record.home_goals, 2);
        assert_eq!(record.season, 1);
        assert_eq!(record.competition, Competition::League);
    }

    #[test]
    fn removing_a_record_reverts_its_contribution() {
        let home = make_club("Hemma", 1);
        let away = make_club("Borta", 100);
        let result = result_between(&home, &away);

        let mut player_stats = HashMap::new();
        let mut club_stats = HashMap::new();
        let record = MatchRecord::from_result(&result, Competition::League, 1, 1);
        apply_record_to_stats(&record, &home, &away, &mut player_stats, &mut club_stats);
        remove_record_from_stats(&record, &home, &away, &mut player_stats, &mut club_stats);

        for stats in player_stats.values() {
            assert_eq!(stats.appearances, 0, "player {}", stats.player_id);
            assert_eq!(stats.minutes, 0);
            assert_eq!(stats.goals, 0);
            assert_eq!(stats.assists, 0);
            assert_eq!(stats.clean_sheets, 0);
            assert_eq!(stats.rating_count, 0);
        }
        for stats in club_stats.values() {
            assert_eq!(stats.played, 0, "club {}", stats.club_name);
            assert_eq!(stats.wins + stats.draws + stats.losses, 0);
            assert_eq!(stats.goals_for, 0);
            assert_eq!(stats.possession_for, 0);
        }
    }

    #[test]
    fn rebuild_from_log_matches_the_incremental_fold() {
        let home = make_club("Hemma", 1);
        let away = make_club("Borta", 100);
        let result = result_between(&home, &away);

        let mut player_stats = HashMap::new();
        let mut club_stats = HashMap::new();
        let mut log = Vec::new();
        for round in 1..=3 {
            let record = MatchRecord::from_result(&result, Competition::League, 1, round);
            apply_record_to_stats(&record, &home, &away, &mut player_stats, &mut club_stats);
            log.push(record);
        }
        // A record from another season must not leak into the rebuild.
        log.push(MatchRecord::from_result(&result, Competition::League, 2, 1));

        let league = league_with(home.clone(), away.clone());
        let (rebuilt_players, rebuilt_clubs) = rebuild_stats_from_log(&log, 1, &league);

        assert_eq!(rebuilt_clubs["Hemma"].played, club_stats["Hemma"].played);
        assert_eq!(rebuilt_clubs["Hemma"].goals_for, club_stats["Hemma"].goals_for);
        let scorer = result.home_lineup[10];
        assert_eq!(rebuilt_players[&scorer].goals, player_stats[&scorer].goals);
        assert_eq!(
            rebuilt_players[&scorer].appearances,
            player_stats[&scorer].appearances
        );
    }

    #[test]
    fn table_snapshot_only_counts_league_games_of_the_season() {
        let home = make_club("Hemma", 1);
        let away = make_club("Borta", 100);
        let result = result_between(&home, &away);

        let league_record = MatchRecord::from_result(&result, Competition::League, 1, 1);
        let cup_record = MatchRecord::from_result(&result, Competition::Cup, 1, 1);
        let old_season = MatchRecord::from_result(&result, Competition::League, 2, 1);

        let table = rebuild_table_snapshot(&[league_record, cup_record, old_season], 1);
        let row = &table["Hemma"];
        assert_eq!(row.mp, 1);
        assert_eq!(row.pts, 3);
        assert_eq!(table["Borta"].losses, 1);
    }

    #[test]
    fn points_identity_holds_after_many_updates() {
        let home = make_club("Hemma", 1);
        let away = make_club("Borta", 100);
        let result = result_between(&home, &away);

        let mut records = Vec::new();
        for round in 1..=6 {
            records.push(MatchRecord::from_result(&result, Competition::League, 1, round));
        }
        let table = rebuild_table_snapshot(&records, 1);
        for row in table.values() {
            assert_eq!(row.pts, 3 * row.w + row.d);
        }
    }
}
