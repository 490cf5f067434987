use game_core::club::{Club, Player, Position};
use game_core::cup::build_cup_bracket;
use game_core::r#match::MatchEventKind;
use game_core::state::GameState;
use game_core::stats::{make_match_id, Competition, MatchRecord, PlayerStats};
use game_core::utils::slugify_with_prefix;
use game_core::LeagueFormat;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

/// Pure projection of a world into the external JSON contract. Never
/// mutates the world; output ordering is deterministic.
pub fn build_contract(gs: &GameState) -> Value {
    let (divisions, team_order, team_index) = build_divisions(gs);
    let players = build_players(gs, &team_index);
    let squads = build_squads(gs, &team_index);
    let standings = build_standings(gs, &team_index);
    let (fixtures, match_index) = build_fixtures_and_matches(gs, &team_index);

    let user_team_id = resolve_user_team_id(gs, &team_order, &team_index);
    let balance = user_team_id
        .as_deref()
        .and_then(|team_id| {
            gs.league
                .clubs()
                .find(|club| team_index.get(&club.name).map(String::as_str) == Some(team_id))
        })
        .map(|club| club.cash_sek);

    let mut meta = serde_json::to_value(&gs.meta).unwrap_or_else(|_| json!({}));
    if let Some(user_team_id) = &user_team_id {
        meta["user_team_id"] = json!(user_team_id);
    }

    let teams: Vec<Value> = team_order.iter().map(|(_, summary)| summary.clone()).collect();

    json!({
        "meta": meta,
        "options": Value::Object(gs.options.clone()),
        "season": {
            "year": gs.season,
            "phase": gs.season_phase.as_str(),
            "round_current": gs.current_round,
            "calendar_week": gs.calendar_week,
        },
        "league": {
            "name": gs.league.name,
            "structure": match gs.league.rules.format {
                LeagueFormat::Pyramid => "pyramid",
                LeagueFormat::Flat => "single_division",
            },
            "divisions": divisions,
        },
        "teams": teams,
        "players": players,
        "standings": standings,
        "fixtures": fixtures,
        "matches": { "by_id": match_index },
        "squads": squads,
        "youth": {
            "offers": build_youth_offers(gs),
            "accepted": [],
            "preference": gs.options.get("youth_preference").cloned().unwrap_or(json!("MF")),
        },
        "transfers": {
            "market": build_market(gs),
            "arrivals": [],
            "departures": [],
        },
        "stats": build_stats_payload(gs),
        "economy": {
            "team_id": user_team_id,
            "balance": balance,
            "ledger": gs.economy_ledger,
        },
        "mail": gs.mailbox,
        "cups": build_cups(gs),
        "history": build_history(gs, &team_index),
    })
}

fn team_id_for(club: &Club) -> String {
    if club.club_id.is_empty() {
        slugify_with_prefix(&club.name, "t")
    } else {
        club.club_id.clone()
    }
}

type TeamOrder = Vec<(String, Value)>;

/// Division entries plus team summaries. Team ids are made unique within
/// the build by suffixing `-1`, `-2`, ...
fn build_divisions(gs: &GameState) -> (Vec<Value>, TeamOrder, HashMap<String, String>) {
    let mut divisions = Vec::new();
    let mut team_order: TeamOrder = Vec::new();
    let mut team_index: HashMap<String, String> = HashMap::new();
    let mut used_ids: HashSet<String> = HashSet::new();

    for (index, division) in gs.league.divisions.iter().enumerate() {
        let division_id = format!("d-{}-{:02}", division.level, index + 1);
        let mut division_team_ids = Vec::new();

        for club in &division.clubs {
            let base_id = team_id_for(club);
            let mut team_id = base_id.clone();
            let mut suffix = 1;
            while !used_ids.insert(team_id.clone()) {
                team_id = format!("{base_id}-{suffix}");
                suffix += 1;
            }

            let summary = json!({
                "id": team_id,
                "name": club.name,
                "stadium": club.stadium(),
                "manager": club.manager_name.clone().unwrap_or_else(|| "Bot Manager".to_string()),
                "division_id": division_id,
                "colors": club.colors,
                "emblem": club.emblem_path,
            });
            division_team_ids.push(json!(team_id));
            team_index.insert(club.name.clone(), team_id);
            team_order.push((club.name.clone(), summary));
        }

        divisions.push(json!({
            "id": division_id,
            "name": division.name,
            "teams": division_team_ids,
        }));
    }

    (divisions, team_order, team_index)
}

fn player_entry(player: &Player, team_id: &str) -> Value {
    json!({
        "id": format!("p-{}", player.id),
        "numeric_id": player.id,
        "team_id": team_id,
        "name": player.full_name(),
        "age": player.age,
        "pos": player.position.as_str(),
        "ovr": player.skill_open as u32 * 3,
        "special": traits_lower(player),
        "status": { "injured": false, "suspended": false },
        "number": player.number,
        "form": player.form_now,
        "season_form": player.form_season,
        "portrait": Value::Null,
    })
}

fn traits_lower(player: &Player) -> Vec<String> {
    player
        .traits
        .iter()
        .map(|t| format!("{t:?}").to_lowercase())
        .collect()
}

fn build_players(gs: &GameState, team_index: &HashMap<String, String>) -> Vec<Value> {
    let mut players = Vec::new();
    for division in &gs.league.divisions {
        for club in &division.clubs {
            let team_id = team_index.get(&club.name).cloned().unwrap_or_default();
            for player in &club.players {
                players.push(player_entry(player, &team_id));
            }
        }
    }
    players
}

fn build_squads(gs: &GameState, team_index: &HashMap<String, String>) -> Value {
    let mut squads = Map::new();
    for division in &gs.league.divisions {
        for club in &division.clubs {
            let team_id = team_index.get(&club.name).cloned().unwrap_or_default();
            let rows: Vec<Value> = club
                .players
                .iter()
                .map(|player| {
                    let scale = (player.skill_open.clamp(1, 30) as f64 / 30.0 * 100.0).round() as u32;
                    json!({
                        "player_id": format!("p-{}", player.id),
                        "number": player.number,
                        "position": player.position.as_str(),
                        "skill": player.skill_open,
                        "form": [player.form_now],
                        "season_form": player.form_season,
                        "traits": traits_lower(player),
                        "status": { "injured": false, "suspended": false },
                        "value_sek": player.value_sek,
                        "attrs": {
                            "pace": scale,
                            "shot": scale,
                            "pass": scale,
                            "def": scale,
                            "phy": scale,
                        },
                    })
                })
                .collect();
            squads.insert(team_id, Value::Array(rows));
        }
    }
    Value::Object(squads)
}

fn build_standings(gs: &GameState, team_index: &HashMap<String, String>) -> Value {
    let mut rows: Vec<(String, Value, (i64, i64, i64))> = Vec::new();
    for (club_name, row) in &gs.table_snapshot {
        let Some(team_id) = team_index.get(club_name) else {
            continue;
        };
        let entry = json!({
            "team_id": team_id,
            "played": row.mp,
            "wins": row.w,
            "draws": row.d,
            "losses": row.losses,
            "goals_for": row.gf,
            "goals_against": row.ga,
            "points": row.pts,
        });
        rows.push((
            club_name.clone(),
            entry,
            (row.pts as i64, row.gd() as i64, row.gf as i64),
        ));
    }
    // Points, goal difference, goals for; club name keeps ties stable.
    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    json!({
        "total": rows.into_iter().map(|(_, entry, _)| entry).collect::<Vec<Value>>(),
        "home": [],
        "away": [],
    })
}

fn record_entry(record: &MatchRecord, team_index: &HashMap<String, String>) -> Value {
    let ratings: Map<String, Value> = {
        let mut pairs: Vec<(u32, f32)> = record.ratings.iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort_by_key(|(player_id, _)| *player_id);
        pairs
            .into_iter()
            .map(|(player_id, rating)| (format!("p-{player_id}"), json!(rating)))
            .collect()
    };

    json!({
        "id": record.match_id(),
        "competition": record.competition,
        "round": record.round,
        "home_id": team_index.get(&record.home),
        "away_id": team_index.get(&record.away),
        "score": { "home": record.home_goals, "away": record.away_goals },
        "events": build_event_entries(record, team_index),
        "ratings": ratings,
        "lineups": {
            "home": record.lineup_home.iter().map(|id| format!("p-{id}")).collect::<Vec<String>>(),
            "away": record.lineup_away.iter().map(|id| format!("p-{id}")).collect::<Vec<String>>(),
        },
        "bench": {
            "home": record.bench_home.iter().map(|id| format!("p-{id}")).collect::<Vec<String>>(),
            "away": record.bench_away.iter().map(|id| format!("p-{id}")).collect::<Vec<String>>(),
        },
    })
}

fn build_event_entries(record: &MatchRecord, team_index: &HashMap<String, String>) -> Vec<Value> {
    let home_ids: HashSet<u32> = record
        .lineup_home
        .iter()
        .chain(record.bench_home.iter())
        .chain(record.minutes_home.keys())
        .copied()
        .collect();

    record
        .events
        .iter()
        .map(|event| {
            let team = event.player_id.map(|player_id| {
                if home_ids.contains(&player_id) {
                    team_index.get(&record.home)
                } else {
                    team_index.get(&record.away)
                }
            });
            let mut entry = json!({
                "minute": event.minute,
                "type": event.kind.slug(),
                "team_id": team.flatten(),
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
        .collect()
}

fn build_fixtures_and_matches(
    gs: &GameState,
    team_index: &HashMap<String, String>,
) -> (Vec<Value>, Value) {
    let mut match_index = Map::new();
    let mut played: HashMap<String, (u8, u8)> = HashMap::new();
    for record in &gs.match_log {
        let match_id = record.match_id();
        played.insert(match_id.clone(), (record.home_goals, record.away_goals));
        match_index.insert(match_id, record_entry(record, team_index));
    }

    let mut fixtures = Vec::new();
    for division in &gs.league.divisions {
        let Some(schedule) = gs.fixtures_by_division.get(&division.name) else {
            continue;
        };
        for fixture in schedule {
            let match_id = make_match_id(Competition::League, fixture.round, &fixture.home, &fixture.away);
            let score = played.get(&match_id);
            fixtures.push(json!({
                "match_id": match_id,
                "round": fixture.round,
                "competition": "league",
                "division": division.name,
                "home_id": team_index.get(&fixture.home),
                "away_id": team_index.get(&fixture.away),
                "status": if score.is_some() { "played" } else { "scheduled" },
                "score": {
                    "home": score.map(|s| s.0).unwrap_or(0),
                    "away": score.map(|s| s.1).unwrap_or(0),
                },
                "date": Value::Null,
            }));
        }
    }

    (fixtures, Value::Object(match_index))
}

fn build_youth_offers(gs: &GameState) -> Value {
    let mut offers = Map::new();
    let mut club_names: Vec<&String> = gs.junior_offers.keys().collect();
    club_names.sort();
    for club_name in club_names {
        let entries: Vec<Value> = gs.junior_offers[club_name]
            .iter()
            .map(|offer| {
                json!({
                    "player_id": format!("p-{}", offer.player_snapshot.id),
                    "age": offer.player_snapshot.age,
                    "ovr": offer.player_snapshot.skill_open,
                    "price": offer.price_sek,
                    "expires_season": offer.expires_season,
                    "traits": traits_lower(&offer.player_snapshot),
                })
            })
            .collect();
        offers.insert(club_name.clone(), Value::Array(entries));
    }
    Value::Object(offers)
}

fn build_market(gs: &GameState) -> Vec<Value> {
    gs.transfer_list
        .iter()
        .map(|listing| {
            let snapshot = listing.player_snapshot.as_ref();
            json!({
                "player_id": listing
                    .player_id
                    .or(snapshot.map(|p| p.id))
                    .map(|id| format!("p-{id}")),
                "club_name": listing.club_name,
                "price": listing.price_sek,
                "age": snapshot.map(|p| p.age),
                "pos": snapshot.map(|p| p.position.as_str()),
                "ovr": snapshot.map(|p| p.skill_open),
                "traits": snapshot.map(traits_lower).unwrap_or_default(),
                "note": listing.note,
            })
        })
        .collect()
}

fn player_stat_entry(stats: &PlayerStats) -> Value {
    json!({
        "player_id": format!("p-{}", stats.player_id),
        "club": stats.club_name,
        "appearances": stats.appearances,
        "minutes": stats.minutes,
        "goals": stats.goals,
        "assists": stats.assists,
        "points": stats.points(),
        "yellows": stats.yellows,
        "reds": stats.reds,
        "clean_sheets": stats.clean_sheets,
        "rating_avg": stats.rating_avg(),
    })
}

fn build_stats_payload(gs: &GameState) -> Value {
    let mut current: Vec<&PlayerStats> = gs.player_stats.values().collect();
    current.sort_by_key(|stats| stats.player_id);
    let mut career: Vec<&PlayerStats> = gs.player_career_stats.values().collect();
    career.sort_by_key(|stats| stats.player_id);

    let players_current: Vec<Value> = current.iter().map(|s| player_stat_entry(s)).collect();
    let players_all: Vec<Value> = career.iter().map(|s| player_stat_entry(s)).collect();

    let club_entry = |stats: &game_core::stats::ClubStats| {
        json!({
            "club": stats.club_name,
            "played": stats.played,
            "wins": stats.wins,
            "draws": stats.draws,
            "losses": stats.losses,
            "goals_for": stats.goals_for,
            "goals_against": stats.goals_against,
            "clean_sheets": stats.clean_sheets,
            "yellows": stats.yellows,
            "reds": stats.reds,
            "possession_avg": stats.possession_avg(),
        })
    };
    let mut club_current: Vec<&game_core::stats::ClubStats> = gs.club_stats.values().collect();
    club_current.sort_by(|a, b| a.club_name.cmp(&b.club_name));
    let mut club_career: Vec<&game_core::stats::ClubStats> = gs.club_career_stats.values().collect();
    club_career.sort_by(|a, b| a.club_name.cmp(&b.club_name));

    let top = |key: fn(&PlayerStats) -> u32| -> Vec<Value> {
        let mut sorted: Vec<&PlayerStats> = current.clone();
        sorted.sort_by(|a, b| key(b).cmp(&key(a)).then(a.player_id.cmp(&b.player_id)));
        sorted
            .into_iter()
            .take(10)
            .map(|stats| {
                json!({
                    "player_id": format!("p-{}", stats.player_id),
                    "value": key(stats),
                })
            })
            .collect()
    };

    let leaders = json!({
        "scorers": top(|s| s.goals),
        "assists": top(|s| s.assists),
        "points": top(|s| s.points()),
        "clean_sheets": top(|s| s.clean_sheets),
    });

    json!({
        "players_current": players_current,
        "players_all": players_all,
        "club_current": club_current.iter().map(|s| club_entry(s)).collect::<Vec<Value>>(),
        "club_all": club_career.iter().map(|s| club_entry(s)).collect::<Vec<Value>>(),
        "leaders": leaders,
        "best_eleven": build_best_eleven(gs, &current),
    })
}

/// 1 GK + 4 DF + 4 MF + 2 FW, each slot filled by the highest season
/// rating average in that position; the XI's captain is its best-rated
/// player.
fn build_best_eleven(gs: &GameState, current: &[&PlayerStats]) -> Value {
    let mut positions: HashMap<u32, Position> = HashMap::new();
    for club in gs.league.clubs() {
        for player in &club.players {
            positions.insert(player.id, player.position);
        }
    }

    let mut buckets: HashMap<Position, Vec<(u32, f64)>> = HashMap::new();
    for stats in current {
        let Some(position) = positions.get(&stats.player_id) else {
            continue;
        };
        buckets
            .entry(*position)
            .or_default()
            .push((stats.player_id, stats.rating_avg()));
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
    }

    let mut eleven: Vec<(u32, f64)> = Vec::new();
    for (position, slots) in [
        (Position::GK, 1usize),
        (Position::DF, 4),
        (Position::MF, 4),
        (Position::FW, 2),
    ] {
        if let Some(bucket) = buckets.get(&position) {
            eleven.extend(bucket.iter().take(slots).copied());
        }
    }

    if eleven.is_empty() {
        return json!([]);
    }

    let captain = eleven
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(player_id, _)| format!("p-{player_id}"));

    json!([{
        "round": Value::Null,
        "team": eleven.iter().map(|(player_id, _)| format!("p-{player_id}")).collect::<Vec<String>>(),
        "captain": captain,
    }])
}

fn build_cups(gs: &GameState) -> Value {
    match &gs.cup_state {
        Some(state) => {
            let bracket = build_cup_bracket(Some(state), &gs.match_log);
            json!({
                "by_id": {
                    "primary": {
                        "bracket": bracket,
                        "fixtures": [],
                        "stats": {},
                    }
                }
            })
        }
        None => json!({ "by_id": {} }),
    }
}

fn build_history(gs: &GameState, team_index: &HashMap<String, String>) -> Value {
    let mut history = Map::new();
    let mut club_names: Vec<&String> = gs.history.snapshot().keys().collect();
    club_names.sort();
    for club_name in club_names {
        let Some(team_id) = team_index.get(club_name) else {
            continue;
        };
        let seasons: Vec<Value> = gs.history.snapshot()[club_name]
            .iter()
            .map(|record| {
                json!({
                    "year": record.season,
                    "league_position": record.league_position,
                    "cup_result": record.cup_result,
                })
            })
            .collect();
        history.insert(team_id.clone(), json!({ "seasons": seasons }));
    }
    Value::Object(history)
}

fn resolve_user_team_id(
    gs: &GameState,
    team_order: &TeamOrder,
    team_index: &HashMap<String, String>,
) -> Option<String> {
    let available: HashSet<&String> = team_index.values().collect();
    if let Some(team_id) = &gs.meta.user_team_id {
        if available.contains(team_id) {
            return Some(team_id.clone());
        }
    }
    team_order
        .first()
        .and_then(|(name, _)| team_index.get(name).cloned())
}
