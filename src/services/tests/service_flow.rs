use game_core::club::Position;
use game_core::state::GameState;
use game_core::utils::GameRng;
use serde_json::{json, Value};
use services::{FeatureFlags, GameService, ServiceContext};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn service_in(dir: &TempDir) -> GameService {
    let context = ServiceContext::from_paths(
        dir.path(),
        Some(dir.path().join("active.json")),
        Some(FeatureFlags::default()),
    )
    .unwrap();
    GameService::new(context)
}

fn create_payload(teams: u64) -> Value {
    json!({
        "structure": "rak",
        "divisions": 1,
        "teams_per_division": teams,
        "user_team": { "name": "Test FC" },
    })
}

fn load_world(path: &Path) -> GameState {
    let raw = fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn save_world(path: &Path, gs: &GameState) {
    fs::write(path, serde_json::to_string_pretty(gs).unwrap()).unwrap();
}

fn active_save_path(service: &GameService) -> std::path::PathBuf {
    service.context.file_path.clone()
}

#[test]
fn create_and_dump_builds_a_complete_contract() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);

    let created = service.create(&create_payload(4)).unwrap();
    assert!(created["career_id"].as_str().unwrap().starts_with("c-"));

    let contract = service.dump(None).unwrap();
    for key in [
        "meta", "options", "season", "league", "teams", "players", "standings", "fixtures",
        "matches", "squads", "youth", "transfers", "stats", "economy", "mail", "cups", "history",
    ] {
        assert!(contract.get(key).is_some(), "missing contract key {key}");
    }
    assert!(contract["meta"]["career_id"].as_str().unwrap().starts_with("c-"));
    assert_eq!(contract["season"]["phase"], "preseason");
    assert_eq!(contract["teams"].as_array().unwrap().len(), 4);
    assert!(contract["players"].as_array().unwrap().len() >= 4 * 13);
    assert!(contract["teams"]
        .as_array()
        .unwrap()
        .iter()
        .any(|team| team["name"] == "Test FC"));
}

#[test]
fn next_week_grows_the_ledger_with_sponsor_entries() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();

    let before = service.dump(None).unwrap()["economy"]["ledger"]
        .as_array()
        .unwrap()
        .len();

    let result = service.next_week().unwrap();
    assert_eq!(result["ok"], true);
    assert_eq!(result["week"], 2);

    let ledger = service.dump(None).unwrap()["economy"]["ledger"]
        .as_array()
        .unwrap()
        .clone();
    let sponsor_entries: Vec<&Value> = ledger[before..]
        .iter()
        .filter(|entry| entry["label"] == "weekly_sponsor")
        .collect();
    assert_eq!(sponsor_entries.len(), 4, "one sponsor entry per club");
    assert!(sponsor_entries.iter().all(|entry| entry["amount"] == 600_000));
}

#[test]
fn simulating_a_fixture_produces_a_final_match_view() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();

    let contract = service.dump(None).unwrap();
    let fixtures = contract["fixtures"].as_array().unwrap();
    assert!(!fixtures.is_empty(), "a league must have scheduled matches");
    let match_id = fixtures[0]["match_id"].as_str().unwrap().to_string();

    let scheduled = service.get_match_details(&match_id).unwrap();
    assert_eq!(scheduled["match"]["status"], "scheduled");
    assert_eq!(scheduled["events"].as_array().unwrap().len(), 0);

    let simulated = service.simulate_fixture(&match_id, "viewer").unwrap();
    assert_eq!(simulated["ok"], true);
    assert_eq!(simulated["status"], "final");

    let details = service.get_match_details(&match_id).unwrap();
    assert_eq!(details["match"]["status"], "final");
    assert!(!details["events"].as_array().unwrap().is_empty());
    assert_eq!(details["lineups"]["home"].as_array().unwrap().len(), 11);
    assert!(details["ratings_by_unit"]["home"].is_object());
    assert!(details["ratings_by_unit"]["away"].is_object());

    let possession_home = details["stats"]["possession"]["home"].as_u64().unwrap();
    let possession_away = details["stats"]["possession"]["away"].as_u64().unwrap();
    assert_eq!(possession_home + possession_away, 100);
}

#[test]
fn bid_acceptance_follows_the_seller_threshold() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(3)).unwrap();
    let save_path = active_save_path(&service);

    let mut gs = load_world(&save_path);
    let seller_name = gs.league.divisions[0].clubs[0].name.clone();
    let buyer_name = gs.league.divisions[0].clubs[1].name.clone();
    let target = gs.league.divisions[0].clubs[0].players[4].clone();

    // Seller leads the table with money in the bank; buyer can afford any bid.
    for (index, club) in gs.league.divisions[0].clubs.iter_mut().enumerate() {
        club.cash_sek = if club.name == buyer_name { 50_000_000 } else { 10_000_000 };
        let pts = [55u32, 30, 25][index.min(2)];
        gs.table_snapshot.insert(
            club.name.clone(),
            game_core::league::TableRow {
                mp: 10,
                w: pts / 3,
                d: pts % 3,
                losses: 0,
                gf: 40,
                ga: 12,
                pts,
            },
        );
    }
    save_world(&save_path, &gs);

    let value = target.value_sek.max(50_000);
    let low_bid = (value as f64 * 0.6) as i64;
    let declined = service
        .submit_bid(&json!({
            "buyer": buyer_name,
            "player_id": target.id,
            "price": low_bid,
        }))
        .unwrap();
    assert_eq!(declined["accepted"], false);
    assert!(declined["reason"].as_str().unwrap().contains("avböjde"));

    let buyer_cash_before = load_world(&save_path)
        .league
        .club_by_name(&buyer_name)
        .unwrap()
        .cash_sek;

    let high_bid = (value as f64 * 1.6) as i64;
    let accepted = service
        .submit_bid(&json!({
            "buyer": buyer_name,
            "player_id": target.id,
            "price": high_bid,
        }))
        .unwrap();
    assert_eq!(accepted["accepted"], true);

    let after = load_world(&save_path);
    let buyer = after.league.club_by_name(&buyer_name).unwrap();
    assert!(buyer.has_player(target.id), "player moved to the buyer");
    assert!(!after
        .league
        .club_by_name(&seller_name)
        .unwrap()
        .has_player(target.id));
    assert_eq!(buyer.cash_sek, buyer_cash_before - high_bid);

    // The completed transfer lands in the mailbox and can be read.
    let mail = service.dump(None).unwrap()["mail"].clone();
    assert!(!mail.as_array().unwrap().is_empty());
    assert_eq!(mail[0]["unread"], true);
    let mail_id = mail[0]["id"].as_str().unwrap().to_string();
    service.mark_mail_read(&mail_id).unwrap();
    let mail = service.dump(None).unwrap()["mail"].clone();
    assert_eq!(mail[0]["unread"], false);
}

#[test]
fn end_season_archives_statistics_and_ages_players() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();
    let save_path = active_save_path(&service);

    let contract = service.dump(None).unwrap();
    let match_id = contract["fixtures"][0]["match_id"].as_str().unwrap().to_string();
    service.simulate_fixture(&match_id, "quick").unwrap();

    // Age one player to the brink of retirement.
    let mut gs = load_world(&save_path);
    let veteran_id = gs.league.divisions[0].clubs[0].players[0].id;
    gs.league.divisions[0].clubs[0].players[0].age = 50;
    let sampled_id = gs.league.divisions[0].clubs[1].players[3].id;
    let sampled_age = gs.league.divisions[0].clubs[1].players[3].age;
    let tracked = gs
        .player_stats
        .iter()
        .find(|(_, stats)| stats.appearances > 0)
        .map(|(player_id, stats)| (*player_id, stats.appearances))
        .expect("simulated match produced appearances");
    save_world(&save_path, &gs);

    let result = service.end_season().unwrap();
    assert_eq!(result["ok"], true);

    let after = load_world(&save_path);
    assert!(after.player_stats.is_empty());
    assert!(after.club_stats.is_empty());
    assert_eq!(
        after.player_stats_history[&1][&tracked.0].appearances,
        tracked.1
    );
    assert_eq!(after.player_career_stats[&tracked.0].seasons, 1);
    let (_, sampled) = after.league.find_player(sampled_id).unwrap();
    assert_eq!(sampled.age, sampled_age + 1);
    assert!(
        after.league.find_player(veteran_id).is_none(),
        "a 51-year-old must retire"
    );
    assert_eq!(after.season, 2);
}

#[test]
fn cup_with_four_clubs_finds_a_winner_in_two_rounds() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();

    let entrants: Vec<String> = service.dump(None).unwrap()["teams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|team| team["name"].as_str().unwrap().to_string())
        .collect();

    service.start_cup(&json!({})).unwrap();

    let first = service.advance_cup().unwrap();
    assert_eq!(first["round"], 1);
    assert_eq!(first["finished"], false);

    let second = service.advance_cup().unwrap();
    assert_eq!(second["round"], 2);
    assert_eq!(second["finished"], true);
    let winner = second["winner"].as_str().unwrap().to_string();
    assert!(entrants.contains(&winner));

    let overview = service.cup_overview().unwrap();
    let rounds = overview["cup"]["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[1]["name"], "Final");
    assert_eq!(overview["cup"]["finished"], true);
    assert_eq!(overview["cup"]["winner"], json!(winner));

    // A finished cup cannot be advanced further.
    let err = service.advance_cup().unwrap_err();
    assert_eq!(err.code(), "STATE_CONFLICT");
}

#[test]
fn resimulating_a_fixture_does_not_inflate_statistics() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();
    let save_path = active_save_path(&service);

    let contract = service.dump(None).unwrap();
    let match_id = contract["fixtures"][0]["match_id"].as_str().unwrap().to_string();

    service.simulate_fixture(&match_id, "quick").unwrap();
    service.simulate_fixture(&match_id, "quick").unwrap();
    service.simulate_fixture(&match_id, "quick").unwrap();

    let gs = load_world(&save_path);
    let logged = gs
        .match_log
        .iter()
        .filter(|record| record.match_id() == match_id)
        .count();
    assert_eq!(logged, 1, "the log holds one record per fixture");

    // One match played: nobody can have more than one appearance, and the
    // career maps must agree with the season maps.
    for stats in gs.player_stats.values() {
        assert!(stats.appearances <= 1, "player {} inflated", stats.player_id);
        assert!(stats.minutes <= 90);
        assert_eq!(
            gs.player_career_stats[&stats.player_id].appearances,
            stats.appearances
        );
        assert_eq!(gs.player_career_stats[&stats.player_id].goals, stats.goals);
    }
    for stats in gs.club_stats.values() {
        assert_eq!(stats.played, 1, "club {} inflated", stats.club_name);
        assert_eq!(gs.club_career_stats[&stats.club_name].played, 1);
    }
    let record = gs
        .match_log
        .iter()
        .find(|record| record.match_id() == match_id)
        .unwrap();
    assert_eq!(
        gs.club_stats[&record.home].goals_for,
        record.home_goals as u32
    );
}

#[test]
fn overriding_a_result_recomputes_the_stat_maps() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();
    let save_path = active_save_path(&service);

    let contract = service.dump(None).unwrap();
    let match_id = contract["fixtures"][0]["match_id"].as_str().unwrap().to_string();
    service.simulate_fixture(&match_id, "quick").unwrap();

    let before = load_world(&save_path);
    let record = before
        .match_log
        .iter()
        .find(|record| record.match_id() == match_id)
        .unwrap()
        .clone();

    // Wipe the timeline and hand the home side a 5-0 walkover.
    service
        .set_match_result(
            &match_id,
            &json!({ "home_goals": 5, "away_goals": 0, "events": [], "ratings": {} }),
        )
        .unwrap();

    let after = load_world(&save_path);
    assert_eq!(after.club_stats[&record.home].goals_for, 5);
    assert_eq!(after.club_stats[&record.away].goals_against, 5);
    assert_eq!(after.club_stats[&record.home].wins, 1);
    assert_eq!(after.club_career_stats[&record.home].goals_for, 5);
    assert_eq!(after.table_snapshot[&record.home].gf, 5);
    assert_eq!(after.table_snapshot[&record.home].pts, 3);

    // With the events gone, no player may keep goals, cards or ratings.
    for stats in after.player_stats.values() {
        assert_eq!(stats.goals, 0, "player {} kept stale goals", stats.player_id);
        assert_eq!(stats.assists, 0);
        assert_eq!(stats.yellows, 0);
        assert_eq!(stats.rating_count, 0);
        assert!(stats.appearances <= 1);
    }
    for stats in after.player_career_stats.values() {
        assert_eq!(stats.goals, 0);
    }
}

#[test]
fn mock_mode_never_touches_disk() {
    let dir = TempDir::new().unwrap();
    let context = ServiceContext::from_paths(
        dir.path(),
        Some(dir.path().join("active.json")),
        Some(FeatureFlags::mock()),
    )
    .unwrap();
    let mut service = GameService::new(context);

    let contract = service.dump(None).unwrap();
    assert_eq!(contract["meta"]["career_id"], "c-mock");
    assert!(!dir.path().join("active.json").exists());

    // Mutations stick in memory across calls without a file appearing.
    service
        .update_options(&json!({ "sound": "off" }))
        .unwrap();
    let contract = service.dump(None).unwrap();
    assert_eq!(contract["options"]["sound"], "off");
    assert!(!dir.path().join("active.json").exists());
}

#[test]
fn mock_worlds_are_seed_stable() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let mut service_a = GameService::new(
        ServiceContext::from_paths(dir_a.path(), None, Some(FeatureFlags::mock())).unwrap(),
    );
    let mut service_b = GameService::new(
        ServiceContext::from_paths(dir_b.path(), None, Some(FeatureFlags::mock())).unwrap(),
    );

    let contract_a = service_a.dump(None).unwrap();
    let contract_b = service_b.dump(None).unwrap();
    assert_eq!(contract_a["teams"], contract_b["teams"]);
    assert_eq!(contract_a["players"], contract_b["players"]);
}

#[test]
fn failed_mutations_leave_the_save_untouched() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();
    let save_path = active_save_path(&service);
    let before = fs::read_to_string(&save_path).unwrap();

    let err = service
        .submit_bid(&json!({ "buyer": "Finns Inte FC", "player_id": 1, "price": 100_000 }))
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let after = fs::read_to_string(&save_path).unwrap();
    assert_eq!(before, after, "failed operation must not persist");
}

#[test]
fn world_round_trips_byte_for_byte_after_reserialisation() {
    let dir = TempDir::new().unwrap();
    let mut service = service_in(&dir);
    service.create(&create_payload(4)).unwrap();
    let save_path = active_save_path(&service);

    let gs = load_world(&save_path);
    let first = serde_json::to_string_pretty(&gs).unwrap();
    let reloaded: GameState = serde_json::from_str(&first).unwrap();
    let second = serde_json::to_string_pretty(&reloaded).unwrap();

    let first_value: Value = serde_json::from_str(&first).unwrap();
    let second_value: Value = serde_json::from_str(&second).unwrap();
    assert_eq!(first_value, second_value);
}

#[test]
fn generated_squads_respect_position_minima() {
    let rules = game_core::league::LeagueRules {
        teams_per_div: 4,
        ..game_core::league::LeagueRules::default()
    };
    let mut rng = GameRng::seeded(99);
    let league = game_core::generator::generate_league("Kontroll", rules, &mut rng);
    for club in league.clubs() {
        assert!(club.position_count(Position::GK) >= 1);
        assert!(club.position_count(Position::DF) >= 4);
        assert!(club.position_count(Position::MF) >= 4);
        assert!(club.position_count(Position::FW) >= 2);
    }
}
