use crate::career::CareerManager;
use crate::context::ServiceContext;
use crate::contract::build_contract;
use crate::details::{build_match_details, find_fixture};
use crate::error::{ServiceError, ServiceResult};
use game_core::club::{Aggressiveness, Club, Position, SubstitutionRule, Tactic};
use game_core::cup::{advance_cup_round, create_cup_state, CupRules};
use game_core::economy::{
    accept_junior_offer, advance_training_week, award_sponsor_activity, process_weekly_economy,
    purchase_listing, refresh_transfer_market, start_form_training, submit_transfer_bid,
    update_player_values, WEEKLY_BASE_INCOME,
};
use game_core::generator::generate_league;
use game_core::league::schedule::build_league_schedule;
use game_core::league::{LeagueFormat, LeagueRules};
use game_core::r#match::{simulate_match, Referee};
use game_core::season::end_season;
use game_core::state::{GameState, MailMessage, SeasonPhase};
use game_core::stats::Competition;
use game_core::utils::{slugify, GameRng};
use log::{debug, info};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// High-level operations over career worlds: load, mutate, optionally
/// persist. Mutations are atomic; a failing operation leaves the on-disk
/// world untouched.
pub struct GameService {
    pub context: ServiceContext,
    mock_state: Option<GameState>,
    rng: GameRng,
}

impl GameService {
    pub fn new(context: ServiceContext) -> Self {
        let rng = if context.flags.mock_mode {
            GameRng::seeded(context.flags.mock_seed)
        } else {
            GameRng::from_entropy()
        };
        GameService {
            context,
            mock_state: None,
            rng,
        }
    }

    pub fn careers(&self) -> CareerManager<'_> {
        CareerManager::new(&self.context)
    }

    // ------------------------------------------------------------------
    // World access
    // ------------------------------------------------------------------

    fn load_state(&mut self, path: Option<&Path>) -> ServiceResult<GameState> {
        if self.context.flags.mock_mode {
            if self.mock_state.is_none() {
                let state = self.initialise_mock_state()?;
                self.mock_state = Some(state);
            }
            return Ok(self.mock_state.clone().expect("mock state present"));
        }

        let target = path.unwrap_or(&self.context.file_path);
        if !target.exists() {
            return Err(ServiceError::not_found(format!(
                "Sparfilen '{}' finns inte.",
                target.display()
            )));
        }
        let raw = fs::read_to_string(target)?;
        let mut state: GameState = serde_json::from_str(&raw)
            .map_err(|err| ServiceError::corrupt(format!("Trasig sparfil: {err}")))?;
        state.ensure_containers();
        Ok(state)
    }

    fn save_state(&mut self, gs: &GameState, path: Option<&Path>) -> ServiceResult<PathBuf> {
        if self.context.flags.mock_mode {
            self.mock_state = Some(gs.clone());
            let target = self
                .context
                .flags
                .mock_data_path
                .clone()
                .unwrap_or_else(|| self.context.file_path.clone());
            if self.context.flags.persist_changes {
                write_atomic(&target, gs)?;
            }
            return Ok(target);
        }

        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.context.file_path.clone());
        write_atomic(&target, gs)?;
        Ok(target)
    }

    fn initialise_mock_state(&mut self) -> ServiceResult<GameState> {
        if let Some(path) = self.context.flags.mock_data_path.clone() {
            if path.exists() {
                let raw = fs::read_to_string(&path)?;
                if let Ok(mut state) = serde_json::from_str::<GameState>(&raw) {
                    state.ensure_containers();
                    return Ok(state);
                }
            }
        }
        Ok(build_mock_state(&mut self.rng, &self.context))
    }

    /// Loads the world, runs `mutate`, and persists only when it succeeds.
    pub fn with_world<T>(
        &mut self,
        path: Option<&Path>,
        persist: bool,
        mutate: impl FnOnce(&mut GameState, &mut GameRng) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut gs = self.load_state(path)?;
        let result = mutate(&mut gs, &mut self.rng)?;
        if persist {
            self.save_state(&gs, path)?;
        }
        Ok(result)
    }

    /// Read-only scope: the world is never persisted.
    pub fn read_world<T>(
        &mut self,
        path: Option<&Path>,
        read: impl FnOnce(&GameState) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let gs = self.load_state(path)?;
        read(&gs)
    }

    // ------------------------------------------------------------------
    // Creation / persistence
    // ------------------------------------------------------------------

    pub fn create(&mut self, payload: &Value) -> ServiceResult<Value> {
        let structure = payload["structure"]
            .as_str()
            .or_else(|| payload["league_structure"].as_str())
            .unwrap_or("pyramid");
        let levels = payload["divisions"].as_u64().unwrap_or(1).max(1) as u8;
        let teams_per_div = payload["teams_per_division"].as_u64().unwrap_or(12).max(2) as usize;

        let rules = LeagueRules {
            format: if structure == "pyramid" {
                LeagueFormat::Pyramid
            } else {
                LeagueFormat::Flat
            },
            teams_per_div,
            levels,
            double_round: true,
            promote: payload["promote"].as_u64().unwrap_or(2) as usize,
            relegate: payload["relegate"].as_u64().unwrap_or(2) as usize,
            divisions_per_level: Vec::new(),
        };

        let league_name = payload["league_name"].as_str().unwrap_or("Karriär");
        let mut league = generate_league(league_name, rules, &mut self.rng);

        // The user club must be renamed before fixtures are built, since
        // fixtures reference clubs by name.
        let user_team = &payload["user_team"];
        if let Some(club) = league
            .divisions
            .first_mut()
            .and_then(|division| division.clubs.first_mut())
        {
            if let Some(name) = user_team["name"].as_str() {
                club.name = name.to_string();
                club.club_id = String::new();
            }
            if let Some(stadium) = user_team["stadium"].as_str() {
                club.stadium_name = Some(stadium.to_string());
            }
            if let Some(emblem) = user_team["emblem"].as_str() {
                club.emblem_path = Some(emblem.to_string());
            }
            if user_team["colors"].is_object() {
                club.colors.home = user_team["colors"]["home"].as_str().map(str::to_string);
                club.colors.away = user_team["colors"]["away"].as_str().map(str::to_string);
            }
            if let Some(manager) = payload["manager"]["name"].as_str() {
                club.manager_name = Some(manager.to_string());
            }
        }

        let fixtures = build_league_schedule(&league);
        let mut gs = GameState::new(league, fixtures);
        gs.season_phase = SeasonPhase::Preseason;
        gs.meta.name = Some(
            payload["name"]
                .as_str()
                .unwrap_or("Karriär")
                .to_string(),
        );
        if let Some(options) = payload["options"].as_object() {
            for (key, value) in options {
                gs.options.insert(key.clone(), value.clone());
            }
        }
        gs.options
            .entry("youth_preference".to_string())
            .or_insert(json!("MF"));
        gs.meta.user_team_id = gs
            .league
            .divisions
            .first()
            .and_then(|division| division.clubs.first())
            .map(|club| club.club_id.clone());

        update_player_values(&mut gs);
        refresh_transfer_market(&mut gs, &mut self.rng);

        let career_id = gs.meta.career_id.clone();
        let target = self.context.saves_dir.join(format!("{career_id}.json"));
        self.save_state(&gs, Some(&target))?;
        self.context = self.context.with_file(target.clone());
        info!("service: created career {career_id}");

        Ok(json!({
            "career_id": career_id,
            "path": target.display().to_string(),
            "game": build_contract(&gs),
        }))
    }

    pub fn dump(&mut self, path: Option<&Path>) -> ServiceResult<Value> {
        self.read_world(path, |gs| Ok(build_contract(gs)))
    }

    pub fn load_career(&mut self, career_id: &str) -> ServiceResult<Value> {
        if self.context.flags.mock_mode && career_id == self.context.flags.mock_career_id {
            return self.dump(None);
        }
        let path = self.careers().resolve(career_id)?;
        self.context = self.context.with_file(path.clone());
        self.dump(Some(&path))
    }

    pub fn save_as(&mut self, name: &str) -> ServiceResult<Value> {
        let mut gs = self.load_state(None)?;
        let safe = slugify(if name.is_empty() { "save" } else { name });
        let career_id = format!("c-{safe}");
        gs.meta.career_id = career_id.clone();
        gs.meta.name = Some(name.to_string());
        let target = self.context.saves_dir.join(format!("{career_id}.json"));
        self.save_state(&gs, Some(&target))?;
        Ok(json!({ "career_id": career_id, "path": target.display().to_string() }))
    }

    // ------------------------------------------------------------------
    // Options / youth / mail
    // ------------------------------------------------------------------

    pub fn update_options(&mut self, updates: &Value) -> ServiceResult<Value> {
        let updates = updates
            .as_object()
            .cloned()
            .ok_or_else(|| ServiceError::invalid_input("options måste vara ett objekt."))?;
        self.with_world(None, true, |gs, _| {
            for (key, value) in updates {
                gs.options.insert(key, value);
            }
            Ok(json!({ "ok": true, "options": Value::Object(gs.options.clone()) }))
        })
    }

    pub fn set_youth_preference(&mut self, preference: &str) -> ServiceResult<Value> {
        if Position::parse(preference).is_none() {
            return Err(ServiceError::invalid_input(format!(
                "Okänd ungdomspreferens '{preference}'."
            )));
        }
        let preference = preference.to_string();
        self.with_world(None, true, move |gs, _| {
            gs.options
                .insert("youth_preference".to_string(), json!(preference));
            Ok(json!({ "ok": true, "preference": gs.options["youth_preference"] }))
        })
    }

    pub fn accept_junior(&mut self, club_name: &str, index: usize) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, _| {
            let player_id = accept_junior_offer(gs, club_name, index)?;
            let name = gs
                .league
                .find_player(player_id)
                .map(|(_, player)| player.full_name())
                .unwrap_or_else(|| format!("Spelare {player_id}"));
            push_mail(
                gs,
                "Juniorkontrakt klart",
                format!("{club_name} har skrivit kontrakt med {name}."),
            );
            Ok(json!({ "ok": true, "player_id": format!("p-{player_id}") }))
        })
    }

    pub fn mark_mail_read(&mut self, mail_id: &str) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, _| {
            let mail = gs
                .mailbox
                .iter_mut()
                .find(|mail| mail.id == mail_id)
                .ok_or_else(|| {
                    ServiceError::not_found(format!("Meddelandet '{mail_id}' hittades inte."))
                })?;
            mail.unread = false;
            Ok(json!({ "ok": true }))
        })
    }

    // ------------------------------------------------------------------
    // Transfers & economy
    // ------------------------------------------------------------------

    pub fn buy_from_market(&mut self, club_name: &str, index: usize) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, _| {
            let (message, player_id) = purchase_listing(gs, club_name, index)?;
            Ok(json!({
                "ok": true,
                "message": message,
                "player_id": format!("p-{player_id}"),
            }))
        })
    }

    pub fn submit_bid(&mut self, payload: &Value) -> ServiceResult<Value> {
        let buyer = payload["buyer"]
            .as_str()
            .ok_or_else(|| ServiceError::invalid_input("buyer och player_id måste anges."))?
            .to_string();
        let player_id = coerce_player_id(&payload["player_id"])
            .ok_or_else(|| ServiceError::invalid_input("buyer och player_id måste anges."))?;
        let price = payload["price"]
            .as_i64()
            .or_else(|| payload["price"].as_f64().map(|price| price as i64))
            .filter(|price| *price > 0);
        if payload["price"].is_number() && price.is_none() {
            return Err(ServiceError::invalid_input("Budet måste vara positivt."));
        }

        self.with_world(None, true, move |gs, _| {
            let outcome = submit_transfer_bid(gs, &buyer, player_id, price)?;
            if outcome.accepted {
                push_mail(gs, "Övergång klar", outcome.message.clone());
                Ok(json!({
                    "ok": true,
                    "accepted": true,
                    "message": outcome.message,
                    "player_id": outcome.player_id.map(|id| format!("p-{id}")),
                }))
            } else {
                Ok(json!({
                    "ok": true,
                    "accepted": false,
                    "reason": outcome.message,
                }))
            }
        })
    }

    pub fn sponsor_activity(&mut self, club_name: &str, amount: i64) -> ServiceResult<Value> {
        if amount <= 0 {
            return Err(ServiceError::invalid_input("Beloppet måste vara positivt."));
        }
        self.with_world(None, true, |gs, _| {
            let message = award_sponsor_activity(gs, club_name, amount)?;
            let balance = gs
                .league
                .club_by_name(club_name)
                .map(|club| club.cash_sek)
                .unwrap_or_default();
            Ok(json!({ "ok": true, "message": message, "balance": balance }))
        })
    }

    pub fn start_training(&mut self, club_name: &str, player_id: u32) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, _| {
            let order = start_form_training(gs, club_name, player_id)?;
            Ok(json!({ "ok": true, "order": order }))
        })
    }

    pub fn list_training(&mut self) -> ServiceResult<Value> {
        self.read_world(None, |gs| Ok(json!({ "ok": true, "orders": gs.training_orders })))
    }

    // ------------------------------------------------------------------
    // Season & calendar
    // ------------------------------------------------------------------

    pub fn start_season(&mut self) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, rng| {
            gs.season_phase = SeasonPhase::InProgress;
            refresh_transfer_market(gs, rng);
            Ok(json!({ "ok": true, "phase": gs.season_phase.as_str() }))
        })
    }

    pub fn end_season(&mut self) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, rng| {
            let closed_season = gs.season;
            let report = end_season(gs, rng);
            gs.season_phase = SeasonPhase::Postseason;
            gs.current_round = 1;
            gs.calendar_week = 1;
            push_mail(
                gs,
                "Säsongen är slut",
                format!(
                    "Säsong {closed_season} är avslutad; {} spelare utvärderades.",
                    report.len()
                ),
            );
            Ok(json!({ "ok": true, "report": report }))
        })
    }

    pub fn next_week(&mut self) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, rng| {
            let mut logs = advance_training_week(gs, rng);
            logs.extend(process_weekly_economy(gs, WEEKLY_BASE_INCOME, rng));
            gs.calendar_week += 1;
            Ok(json!({ "ok": true, "week": gs.calendar_week, "logs": logs }))
        })
    }

    // ------------------------------------------------------------------
    // Matches
    // ------------------------------------------------------------------

    pub fn get_match_details(&mut self, match_id: &str) -> ServiceResult<Value> {
        self.read_world(None, |gs| build_match_details(gs, match_id))
    }

    pub fn simulate_fixture(&mut self, match_id: &str, mode: &str) -> ServiceResult<Value> {
        let match_id = match_id.to_string();
        let mode = mode.to_string();
        self.with_world(None, true, move |gs, rng| {
            let (_, fixture) = find_fixture(gs, &match_id).ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Match '{match_id}' hittades inte bland schemalagda matcher."
                ))
            })?;

            let home = gs.league.club_by_name(&fixture.home).ok_or_else(|| {
                ServiceError::not_found("Matchens lag saknas i ligan.".to_string())
            })?;
            let away = gs.league.club_by_name(&fixture.away).ok_or_else(|| {
                ServiceError::not_found("Matchens lag saknas i ligan.".to_string())
            })?;

            let result = simulate_match(
                home,
                away,
                &Referee::default(),
                &home.tactic,
                &away.tactic,
                home.aggressiveness,
                away.aggressiveness,
                rng,
            );

            // Re-simulation replaces the earlier record AND its statistics.
            gs.remove_recorded_match(&match_id);
            gs.record_result(&result, Competition::League, fixture.round);
            gs.current_round = gs.current_round.max(fixture.round + 1);

            Ok(json!({
                "ok": true,
                "match_id": match_id,
                "status": "final",
                "mode": mode,
            }))
        })
    }

    pub fn set_match_result(&mut self, match_id: &str, payload: &Value) -> ServiceResult<Value> {
        let match_id = match_id.to_string();
        let payload = payload.clone();
        self.with_world(None, true, move |gs, _| {
            // amend_record reverts the old record's statistics and folds
            // the edited one back in, season maps rebuilt from the log.
            let updated = gs.amend_record(&match_id, |record| {
                if let Some(home_goals) = payload["home_goals"].as_u64() {
                    record.home_goals = home_goals.min(u8::MAX as u64) as u8;
                    record.home_stats.goals = record.home_goals;
                }
                if let Some(away_goals) = payload["away_goals"].as_u64() {
                    record.away_goals = away_goals.min(u8::MAX as u64) as u8;
                    record.away_stats.goals = record.away_goals;
                }
                record.halftime_home = record.halftime_home.min(record.home_goals);
                record.halftime_away = record.halftime_away.min(record.away_goals);
                if let Some(events) = payload["events"].as_array() {
                    record.events = events
                        .iter()
                        .filter_map(|event| serde_json::from_value(event.clone()).ok())
                        .collect();
                }
                if let Some(ratings) = payload["ratings"].as_object() {
                    record.ratings = ratings
                        .iter()
                        .filter_map(|(key, value)| {
                            let player_id = coerce_player_id(&json!(key))?;
                            let rating = value.as_f64()? as f32;
                            Some((player_id, rating))
                        })
                        .collect();
                }
            });
            if updated.is_none() {
                return Err(ServiceError::not_found(format!(
                    "Match '{match_id}' hittades inte i matchloggen."
                )));
            }
            Ok(json!({ "ok": true, "match_id": match_id }))
        })
    }

    // ------------------------------------------------------------------
    // Tactics
    // ------------------------------------------------------------------

    pub fn set_tactics(&mut self, team_id: &str, data: &Value) -> ServiceResult<Value> {
        let team_id = team_id.to_string();
        let data = data.clone();
        self.with_world(None, true, move |gs, _| {
            let club = gs
                .league
                .clubs_mut()
                .find(|club| club.club_id == team_id)
                .ok_or_else(|| {
                    ServiceError::not_found(format!("Lag '{team_id}' hittades inte."))
                })?;
            apply_tactics(club, &data)?;
            Ok(json!({ "ok": true }))
        })
    }

    // ------------------------------------------------------------------
    // Cup
    // ------------------------------------------------------------------

    pub fn start_cup(&mut self, payload: &Value) -> ServiceResult<Value> {
        let rules = CupRules {
            two_legged: payload["two_legged"].as_bool().unwrap_or(true),
            final_two_legged: payload["final_two_legged"].as_bool().unwrap_or(false),
        };
        self.with_world(None, true, move |gs, _| {
            if let Some(cup) = &gs.cup_state {
                if !cup.finished {
                    return Err(ServiceError::conflict(
                        "Cupen pågår redan; spela klart den innan en ny startas.",
                    ));
                }
            }
            let entrants: Vec<String> = gs.league.clubs().map(|club| club.name.clone()).collect();
            let state = create_cup_state(&entrants, rules);
            let field_size = state.current_clubs.len();
            gs.cup_state = Some(state);
            debug!("service: cup started with {} slots", field_size);
            Ok(json!({ "ok": true, "entrants": entrants.len(), "field": field_size }))
        })
    }

    pub fn advance_cup(&mut self) -> ServiceResult<Value> {
        self.with_world(None, true, |gs, rng| {
            let Some(mut cup) = gs.cup_state.take() else {
                return Err(ServiceError::conflict("Ingen cup pågår."));
            };
            if cup.finished {
                gs.cup_state = Some(cup);
                return Err(ServiceError::conflict("Cupen är redan avgjord."));
            }

            let results = advance_cup_round(&mut cup, &gs.league, &Referee::default(), rng);
            let round = cup.round_index;
            for result in &results {
                gs.record_result(result, Competition::Cup, round);
            }

            let response = json!({
                "ok": true,
                "round": round,
                "played": results.len(),
                "finished": cup.finished,
                "winner": cup.winner,
            });
            gs.cup_state = Some(cup);
            Ok(response)
        })
    }

    pub fn cup_overview(&mut self) -> ServiceResult<Value> {
        self.read_world(None, |gs| {
            let bracket = game_core::cup::build_cup_bracket(gs.cup_state.as_ref(), &gs.match_log);
            Ok(json!({ "ok": true, "cup": bracket }))
        })
    }
}

fn push_mail(gs: &mut GameState, subject: &str, body: String) {
    let id = format!("m-{}", gs.mailbox.len() + 1);
    let season = gs.season;
    let week = gs.calendar_week;
    gs.mailbox.push(MailMessage::new(id, subject, body, season, week));
}

fn write_atomic(path: &Path, gs: &GameState) -> ServiceResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(gs)
        .map_err(|err| ServiceError::Unexpected(err.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn coerce_player_id(value: &Value) -> Option<u32> {
    if let Some(id) = value.as_u64() {
        return u32::try_from(id).ok();
    }
    let text = value.as_str()?;
    let digits = text.strip_prefix("p-").unwrap_or(text);
    digits.parse().ok()
}

fn apply_tactics(club: &mut Club, data: &Value) -> ServiceResult<()> {
    let tactic_data = &data["tactic"];
    if tactic_data.is_object() {
        club.tactic = Tactic {
            attacking: tactic_data["attacking"]
                .as_bool()
                .unwrap_or(club.tactic.attacking),
            defending: tactic_data["defending"]
                .as_bool()
                .unwrap_or(club.tactic.defending),
            offside_trap: tactic_data["offside_trap"]
                .as_bool()
                .unwrap_or(club.tactic.offside_trap),
            dark_arts: tactic_data["dark_arts"]
                .as_bool()
                .unwrap_or(club.tactic.dark_arts),
            tempo: tactic_data["tempo"]
                .as_f64()
                .map(|tempo| tempo as f32)
                .unwrap_or(club.tactic.tempo),
        };
    }

    if let Some(aggressiveness) = data["aggressiveness"].as_str() {
        club.aggressiveness = Aggressiveness::parse(aggressiveness).ok_or_else(|| {
            ServiceError::invalid_input(format!("Okänd aggressivitet '{aggressiveness}'."))
        })?;
    }

    if !data["captain_id"].is_null() {
        let captain = coerce_player_id(&data["captain_id"]);
        if let Some(captain) = captain {
            if !club.has_player(captain) {
                return Err(ServiceError::invalid_input(format!(
                    "Spelare {captain} finns inte i {}.",
                    club.name
                )));
            }
            club.captain_id = Some(captain);
        } else {
            club.captain_id = None;
        }
    }

    if let Some(lineup) = data["preferred_lineup"].as_array() {
        club.preferred_lineup = lineup.iter().filter_map(coerce_player_id).collect();
    }
    if let Some(bench) = data["bench_order"].as_array() {
        club.bench_order = bench.iter().filter_map(coerce_player_id).collect();
    }
    if let Some(plan) = data["substitution_plan"].as_array() {
        club.substitution_plan = plan
            .iter()
            .filter_map(|rule| {
                let minute = rule["minute"].as_u64().unwrap_or(60).min(90) as u8;
                Some(SubstitutionRule {
                    minute,
                    player_in: coerce_player_id(&rule["player_in"]),
                    player_out: coerce_player_id(&rule["player_out"]),
                    position: rule["position"].as_str().and_then(Position::parse),
                    on_injury: rule["on_injury"].as_bool().unwrap_or(false),
                })
            })
            .collect();
    }

    Ok(())
}

/// Seeded demo world for mock mode: a small league with half a round of
/// played matches and a primed market.
fn build_mock_state(rng: &mut GameRng, context: &ServiceContext) -> GameState {
    let rules = LeagueRules {
        format: LeagueFormat::Pyramid,
        teams_per_div: 6,
        levels: 1,
        double_round: true,
        promote: 2,
        relegate: 2,
        divisions_per_level: Vec::new(),
    };
    let league = generate_league("Demo League", rules, rng);
    let fixtures = build_league_schedule(&league);
    let mut gs = GameState::new(league, fixtures);

    gs.meta.career_id = context.flags.mock_career_id.clone();
    gs.meta.name = Some("Demo-karriär".to_string());
    gs.meta.user_team_id = gs
        .league
        .divisions
        .first()
        .and_then(|division| division.clubs.first())
        .map(|club| club.club_id.clone());
    gs.options.insert("mock_mode".to_string(), json!(true));
    gs.season_phase = SeasonPhase::InProgress;

    update_player_values(&mut gs);
    refresh_transfer_market(&mut gs, rng);

    // Play half of the opening round so the demo has real content.
    if let Some(division) = gs.league.divisions.first() {
        let division_name = division.name.clone();
        let to_play = (division.clubs.len() / 2).max(1);
        let fixtures: Vec<game_core::league::Fixture> = gs
            .fixtures_by_division
            .get(&division_name)
            .map(|schedule| schedule.iter().take(to_play).cloned().collect())
            .unwrap_or_default();
        for fixture in fixtures {
            let Some(home) = gs.league.club_by_name(&fixture.home) else {
                continue;
            };
            let Some(away) = gs.league.club_by_name(&fixture.away) else {
                continue;
            };
            let result = simulate_match(
                home,
                away,
                &Referee::new("", 7, 5),
                &home.tactic,
                &away.tactic,
                home.aggressiveness,
                away.aggressiveness,
                rng,
            );
            gs.record_result(&result, Competition::League, fixture.round);
            gs.current_round = gs.current_round.max(fixture.round + 1);
        }
    }

    if gs.economy_ledger.is_empty() {
        process_weekly_economy(&mut gs, WEEKLY_BASE_INCOME, rng);
    }
    gs
}
