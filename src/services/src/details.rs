use crate::error::{ServiceError, ServiceResult};
use game_core::club::{Club, Player};
use game_core::r#match::{select_lineup, MatchEventKind, TacticSnapshot};
use game_core::state::GameState;
use game_core::stats::{make_match_id, Competition, MatchRecord};
use game_core::utils::slugify_with_prefix;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct PlayerSummary {
    minutes: u32,
    goals: u32,
    assists: u32,
    yellows: Vec<u8>,
    reds: Vec<u8>,
    pens_missed: Vec<u8>,
    injury: bool,
    sub_in: Option<u8>,
    sub_out: Option<u8>,
}

impl PlayerSummary {
    fn icons(&self) -> Vec<&'static str> {
        let mut icons = Vec::new();
        if self.goals > 0 {
            icons.push("goal");
        }
        if self.assists > 0 {
            icons.push("assist");
        }
        if !self.yellows.is_empty() {
            icons.push("yc");
        }
        if !self.reds.is_empty() {
            icons.push("rc");
        }
        if !self.pens_missed.is_empty() {
            icons.push("pen_missed");
        }
        if self.injury {
            icons.push("injury");
        }
        if self.sub_in.is_some() {
            icons.push("sub_in");
        }
        if self.sub_out.is_some() {
            icons.push("sub_out");
        }
        icons
    }

    fn bookings(&self) -> Vec<Value> {
        let mut bookings = Vec::new();
        for minute in &self.yellows {
            bookings.push(json!({ "type": "yc", "minute": minute }));
        }
        for minute in &self.reds {
            bookings.push(json!({ "type": "rc", "minute": minute }));
        }
        bookings
    }
}

fn summarise_events(record: &MatchRecord) -> HashMap<u32, PlayerSummary> {
    let mut summary: HashMap<u32, PlayerSummary> = HashMap::new();
    for event in &record.events {
        match event.kind {
            MatchEventKind::Goal | MatchEventKind::PenaltyScored => {
                if let Some(player_id) = event.player_id {
                    summary.entry(player_id).or_default().goals += 1;
                }
                if event.kind == MatchEventKind::Goal {
                    if let Some(assist_id) = event.assist_id {
                        summary.entry(assist_id).or_default().assists += 1;
                    }
                }
            }
            MatchEventKind::PenaltyMissed => {
                if let Some(player_id) = event.player_id {
                    summary
                        .entry(player_id)
                        .or_default()
                        .pens_missed
                        .push(event.minute);
                }
            }
            MatchEventKind::Yellow => {
                if let Some(player_id) = event.player_id {
                    summary.entry(player_id).or_default().yellows.push(event.minute);
                }
            }
            MatchEventKind::Red => {
                if let Some(player_id) = event.player_id {
                    summary.entry(player_id).or_default().reds.push(event.minute);
                }
            }
            MatchEventKind::Injury => {
                if let Some(player_id) = event.player_id {
                    summary.entry(player_id).or_default().injury = true;
                }
            }
            MatchEventKind::Substitution => {
                if let Some(player_in) = event.player_id {
                    summary.entry(player_in).or_default().sub_in = Some(event.minute);
                }
                if let Some(player_out) = event.assist_id {
                    summary.entry(player_out).or_default().sub_out = Some(event.minute);
                }
            }
            MatchEventKind::Offside => {}
        }
    }
    summary
}

fn player_name(players: &HashMap<u32, &Player>, player_id: u32) -> String {
    players
        .get(&player_id)
        .map(|player| player.full_name())
        .unwrap_or_else(|| format!("Spelare {player_id}"))
}

#[allow(clippy::too_many_arguments)]
fn lineup_rows(
    club: &Club,
    players: &HashMap<u32, &Player>,
    lineup_ids: &[u32],
    bench_ids: &[u32],
    minutes: &HashMap<u32, u8>,
    ratings: &HashMap<u32, f32>,
    summary: &mut HashMap<u32, PlayerSummary>,
) -> (Vec<Value>, Vec<String>) {
    // The starting XI only; players who came on stay visible through the
    // bench list and the event timeline.
    let mut ordered: Vec<u32> = Vec::new();
    for player_id in lineup_ids {
        if !ordered.contains(player_id) {
            ordered.push(*player_id);
        }
    }

    let rows = ordered
        .iter()
        .map(|player_id| {
            let entry = summary.entry(*player_id).or_default();
            entry.minutes = minutes.get(player_id).copied().unwrap_or(0) as u32;
            let subs = if entry.sub_in.is_some() || entry.sub_out.is_some() {
                json!({ "in": entry.sub_in, "out": entry.sub_out })
            } else {
                Value::Null
            };
            let position = players
                .get(player_id)
                .map(|player| player.position.as_str())
                .unwrap_or("MF");
            json!({
                "player_id": format!("p-{player_id}"),
                "name": player_name(players, *player_id),
                "pos": position,
                "minutes": entry.minutes,
                "captain": club.captain_id == Some(*player_id),
                "injured": entry.injury,
                "bookings": entry.bookings(),
                "subs": subs,
                "rating": ratings.get(player_id),
                "icons": entry.icons(),
            })
        })
        .collect();

    let bench = bench_ids.iter().map(|id| format!("p-{id}")).collect();
    (rows, bench)
}

fn event_list(record: &MatchRecord, home_id: &str, away_id: &str) -> Vec<Value> {
    let home_ids: std::collections::HashSet<u32> = record
        .lineup_home
        .iter()
        .chain(record.bench_home.iter())
        .chain(record.minutes_home.keys())
        .copied()
        .collect();
    let away_ids: std::collections::HashSet<u32> = record
        .lineup_away
        .iter()
        .chain(record.bench_away.iter())
        .chain(record.minutes_away.keys())
        .copied()
        .collect();

    let mut events: Vec<Value> = record
        .events
        .iter()
        .map(|event| {
            let team_id = event
                .player_id
                .or(event.assist_id)
                .and_then(|player_id| {
                    if home_ids.contains(&player_id) {
                        Some(home_id)
                    } else if away_ids.contains(&player_id) {
                        Some(away_id)
                    } else {
                        None
                    }
                });
            let mut entry = json!({
                "minute": event.minute,
                "type": event.kind.slug(),
                "team_id": team_id,
                "player_id": event.player_id.map(|id| format!("p-{id}")),
                "assist_id": event.assist_id.map(|id| format!("p-{id}")),
                "detail": event.note,
            });
            if event.kind == MatchEventKind::Substitution {
                if let Some(player_in) = event.player_id {
                    entry["sub_in_id"] = json!(format!("p-{player_in}"));
                }
                if let Some(player_out) = event.assist_id {
                    entry["sub_out_id"] = json!(format!("p-{player_out}"));
                }
            }
            entry
        })
        .collect();

    events.push(json!({
        "minute": 45,
        "type": "ht",
        "team_id": Value::Null,
        "player_id": Value::Null,
        "assist_id": Value::Null,
        "detail": format!("{}-{}", record.halftime_home, record.halftime_away),
    }));
    events.push(json!({
        "minute": 90,
        "type": "ft",
        "team_id": Value::Null,
        "player_id": Value::Null,
        "assist_id": Value::Null,
        "detail": format!("{}-{}", record.home_goals, record.away_goals),
    }));

    events.sort_by(|a, b| {
        let minute_a = a["minute"].as_u64().unwrap_or(0);
        let minute_b = b["minute"].as_u64().unwrap_or(0);
        minute_a
            .cmp(&minute_b)
            .then_with(|| a["type"].as_str().unwrap_or("").cmp(b["type"].as_str().unwrap_or("")))
    });
    events
}

fn stats_section(record: &MatchRecord) -> Value {
    json!({
        "possession": {
            "home": record.home_stats.possession_pct,
            "away": record.away_stats.possession_pct,
            "ht_home": record.home_stats.possession_pct,
            "ht_away": record.away_stats.possession_pct,
        },
        "chances": {
            "home": record.home_stats.shots_on,
            "away": record.away_stats.shots_on,
            "ht_home": record.halftime_home,
            "ht_away": record.halftime_away,
        },
    })
}

fn default_stats() -> Value {
    json!({
        "possession": { "home": 50, "away": 50, "ht_home": 50, "ht_away": 50 },
        "chances": { "home": 0, "away": 0, "ht_home": 0, "ht_away": 0 },
    })
}

fn team_section(club: &Club, team_id: &str, is_home: bool) -> Value {
    json!({
        "id": team_id,
        "name": club.name,
        "shirt": { "home": is_home, "colors": club.colors },
    })
}

fn league_section(gs: &GameState, round: u32) -> Value {
    json!({
        "id": slugify_with_prefix(&gs.league.name, "L"),
        "name": gs.league.name,
        "season": gs.season,
        "round": round,
    })
}

struct WorldIndex<'g> {
    clubs: HashMap<&'g str, &'g Club>,
    players: HashMap<u32, &'g Player>,
}

fn index_world(gs: &GameState) -> WorldIndex<'_> {
    let mut clubs: HashMap<&str, &Club> = HashMap::new();
    let mut players: HashMap<u32, &Player> = HashMap::new();
    for club in gs.league.clubs() {
        clubs.insert(club.name.as_str(), club);
        for player in &club.players {
            players.insert(player.id, player);
        }
    }
    WorldIndex { clubs, players }
}

fn details_from_record(
    gs: &GameState,
    match_id: &str,
    record: &MatchRecord,
    index: &WorldIndex<'_>,
) -> ServiceResult<Value> {
    let home_club = index
        .clubs
        .get(record.home.as_str())
        .ok_or_else(|| ServiceError::not_found("Matchens lag saknas i ligan.".to_string()))?;
    let away_club = index
        .clubs
        .get(record.away.as_str())
        .ok_or_else(|| ServiceError::not_found("Matchens lag saknas i ligan.".to_string()))?;

    let mut summary = summarise_events(record);
    let (home_rows, bench_home) = lineup_rows(
        home_club,
        &index.players,
        &record.lineup_home,
        &record.bench_home,
        &record.minutes_home,
        &record.ratings,
        &mut summary,
    );
    let (away_rows, bench_away) = lineup_rows(
        away_club,
        &index.players,
        &record.lineup_away,
        &record.bench_away,
        &record.minutes_away,
        &record.ratings,
        &mut summary,
    );

    let events = event_list(record, &home_club.club_id, &away_club.club_id);

    Ok(json!({
        "match": {
            "id": match_id,
            "league": league_section(gs, record.round),
            "venue": { "stadium": home_club.stadium(), "city": Value::Null },
            "datetime_utc": Value::Null,
            "referee": record.referee,
            "status": "final",
            "score": {
                "home": record.home_goals,
                "away": record.away_goals,
                "ht_home": record.halftime_home,
                "ht_away": record.halftime_away,
            },
        },
        "teams": {
            "home": team_section(home_club, &home_club.club_id, true),
            "away": team_section(away_club, &away_club.club_id, false),
        },
        "lineups": {
            "home": home_rows,
            "away": away_rows,
            "bench_home": bench_home,
            "bench_away": bench_away,
            "formation_home": record.formation_home,
            "formation_away": record.formation_away,
        },
        "events": events,
        "stats": stats_section(record),
        "ratings_by_unit": record.ratings_by_unit,
        "tactics_report": record.tactic_report,
        "awards": {
            "mom_home": record.awards.mom_home.map(|id| format!("p-{id}")),
            "mom_away": record.awards.mom_away.map(|id| format!("p-{id}")),
        },
    }))
}

fn details_for_fixture(
    gs: &GameState,
    match_id: &str,
    round: u32,
    home_club: &Club,
    away_club: &Club,
    index: &WorldIndex<'_>,
) -> Value {
    let (home_lineup, home_bench) = select_lineup(home_club);
    let (away_lineup, away_bench) = select_lineup(away_club);

    let zero_minutes_home: HashMap<u32, u8> = home_lineup.iter().map(|id| (*id, 0)).collect();
    let zero_minutes_away: HashMap<u32, u8> = away_lineup.iter().map(|id| (*id, 0)).collect();
    let no_ratings: HashMap<u32, f32> = HashMap::new();

    let mut summary: HashMap<u32, PlayerSummary> = HashMap::new();
    let (home_rows, bench_home) = lineup_rows(
        home_club,
        &index.players,
        &home_lineup,
        &home_bench,
        &zero_minutes_home,
        &no_ratings,
        &mut summary,
    );
    let (away_rows, bench_away) = lineup_rows(
        away_club,
        &index.players,
        &away_lineup,
        &away_bench,
        &zero_minutes_away,
        &no_ratings,
        &mut summary,
    );

    let home_positions: Vec<game_core::club::Position> = home_lineup
        .iter()
        .filter_map(|id| index.players.get(id).map(|p| p.position))
        .collect();
    let away_positions: Vec<game_core::club::Position> = away_lineup
        .iter()
        .filter_map(|id| index.players.get(id).map(|p| p.position))
        .collect();
    let home_snapshot = TacticSnapshot::for_club(home_club, &home_positions);
    let away_snapshot = TacticSnapshot::for_club(away_club, &away_positions);

    json!({
        "match": {
            "id": match_id,
            "league": league_section(gs, round),
            "venue": { "stadium": home_club.stadium(), "city": Value::Null },
            "datetime_utc": Value::Null,
            "referee": { "name": Value::Null, "skill": Value::Null, "hardness": Value::Null },
            "status": "scheduled",
            "score": { "home": 0, "away": 0, "ht_home": 0, "ht_away": 0 },
        },
        "teams": {
            "home": team_section(home_club, &home_club.club_id, true),
            "away": team_section(away_club, &away_club.club_id, false),
        },
        "lineups": {
            "home": home_rows,
            "away": away_rows,
            "bench_home": bench_home,
            "bench_away": bench_away,
            "formation_home": home_snapshot.formation,
            "formation_away": away_snapshot.formation,
        },
        "events": [],
        "stats": default_stats(),
        "ratings_by_unit": { "home": {}, "away": {} },
        "tactics_report": { "home": home_snapshot, "away": away_snapshot },
        "awards": { "mom_home": Value::Null, "mom_away": Value::Null },
    })
}

/// Locates the scheduled league fixture carrying `match_id`.
pub fn find_fixture(gs: &GameState, match_id: &str) -> Option<(String, game_core::league::Fixture)> {
    if !match_id.starts_with("l-") {
        return None;
    }
    for division in &gs.league.divisions {
        let Some(schedule) = gs.fixtures_by_division.get(&division.name) else {
            continue;
        };
        for fixture in schedule {
            let candidate =
                make_match_id(Competition::League, fixture.round, &fixture.home, &fixture.away);
            if candidate == match_id {
                return Some((division.name.clone(), fixture.clone()));
            }
        }
    }
    None
}

/// Full details for one match id: the final view when the match is in the
/// log, otherwise the scheduled preview of the fixture.
pub fn build_match_details(gs: &GameState, match_id: &str) -> ServiceResult<Value> {
    let index = index_world(gs);

    if let Some(record) = gs
        .match_log
        .iter()
        .find(|record| record.match_id() == match_id)
    {
        return details_from_record(gs, match_id, record, &index);
    }

    if let Some((_, fixture)) = find_fixture(gs, match_id) {
        let home_club = index.clubs.get(fixture.home.as_str()).ok_or_else(|| {
            ServiceError::not_found("Matchens lag saknas i ligan.".to_string())
        })?;
        let away_club = index.clubs.get(fixture.away.as_str()).ok_or_else(|| {
            ServiceError::not_found("Matchens lag saknas i ligan.".to_string())
        })?;
        return Ok(details_for_fixture(
            gs,
            match_id,
            fixture.round,
            home_club,
            away_club,
            &index,
        ));
    }

    Err(ServiceError::not_found(format!(
        "Match '{match_id}' hittades inte."
    )))
}
