use crate::club::Club;
use crate::cup::CupState;
use crate::economy::{JuniorOffer, LedgerDate, LedgerEntry, TrainingOrder, TransferListing};
use crate::league::{Fixture, League, TableRow};
use crate::r#match::MatchResult;
use crate::state::{HistoryStore, MailMessage};
use crate::stats::{
    apply_record_to_stats, rebuild_stats_from_log, rebuild_table_snapshot,
    remove_record_from_stats, update_stats_from_result, ClubStats, Competition, MatchRecord,
    PlayerStats,
};
use crate::utils::slugify_with_prefix;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    #[default]
    Preseason,
    InProgress,
    Postseason,
}

impl SeasonPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonPhase::Preseason => "preseason",
            SeasonPhase::InProgress => "in_progress",
            SeasonPhase::Postseason => "postseason",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerMeta {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub career_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_team_id: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for CareerMeta {
    fn default() -> Self {
        CareerMeta {
            version: default_version(),
            career_id: String::new(),
            name: None,
            user_team_id: None,
        }
    }
}

pub fn new_career_id() -> String {
    format!("c-{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn default_options() -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("cheats".to_string(), json!(false));
    options.insert("graphics".to_string(), json!({ "quality": "medium" }));
    options
}

fn one() -> u32 {
    1
}

/// The aggregate career world. Owns every entity; all cross-references go
/// through player ids and club names resolved against `league`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "one")]
    pub season: u32,
    pub league: League,
    #[serde(default)]
    pub fixtures_by_division: HashMap<String, Vec<Fixture>>,
    #[serde(default = "one")]
    pub current_round: u32,
    #[serde(default)]
    pub season_phase: SeasonPhase,
    #[serde(default = "one")]
    pub calendar_week: u32,

    #[serde(default)]
    pub cup_state: Option<CupState>,
    #[serde(default)]
    pub table_snapshot: HashMap<String, TableRow>,

    #[serde(default)]
    pub player_stats: HashMap<u32, PlayerStats>,
    #[serde(default)]
    pub player_career_stats: HashMap<u32, PlayerStats>,
    #[serde(default)]
    pub club_stats: HashMap<String, ClubStats>,
    #[serde(default)]
    pub club_career_stats: HashMap<String, ClubStats>,
    #[serde(default)]
    pub match_log: Vec<MatchRecord>,
    #[serde(default)]
    pub player_stats_history: HashMap<u32, HashMap<u32, PlayerStats>>,
    #[serde(default)]
    pub club_stats_history: HashMap<u32, HashMap<String, ClubStats>>,

    #[serde(default)]
    pub training_orders: Vec<TrainingOrder>,
    #[serde(default)]
    pub transfer_list: Vec<TransferListing>,
    #[serde(default)]
    pub junior_offers: HashMap<String, Vec<JuniorOffer>>,
    #[serde(default)]
    pub economy_ledger: Vec<LedgerEntry>,
    #[serde(default)]
    pub mailbox: Vec<MailMessage>,

    #[serde(default)]
    pub meta: CareerMeta,
    #[serde(default = "default_options")]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub history: HistoryStore,
}

impl GameState {
    pub fn new(league: League, fixtures_by_division: HashMap<String, Vec<Fixture>>) -> Self {
        let mut state = GameState {
            season: 1,
            league,
            fixtures_by_division,
            current_round: 1,
            season_phase: SeasonPhase::Preseason,
            calendar_week: 1,
            cup_state: None,
            table_snapshot: HashMap::new(),
            player_stats: HashMap::new(),
            player_career_stats: HashMap::new(),
            club_stats: HashMap::new(),
            club_career_stats: HashMap::new(),
            match_log: Vec::new(),
            player_stats_history: HashMap::new(),
            club_stats_history: HashMap::new(),
            training_orders: Vec::new(),
            transfer_list: Vec::new(),
            junior_offers: HashMap::new(),
            economy_ledger: Vec::new(),
            mailbox: Vec::new(),
            meta: CareerMeta::default(),
            options: default_options(),
            history: HistoryStore::new(),
        };
        state.ensure_containers();
        state
    }

    /// Heals a world after load: fills missing meta/options, assigns unique
    /// club ids and drops dangling captain references. Legacy saves with
    /// missing containers already coerced through the serde defaults.
    pub fn ensure_containers(&mut self) {
        if self.meta.version.is_empty() {
            self.meta.version = default_version();
        }
        if self.meta.career_id.is_empty() {
            self.meta.career_id = new_career_id();
        }
        if !self.options.contains_key("cheats") {
            self.options.insert("cheats".to_string(), json!(false));
        }
        if !self.options.contains_key("graphics") {
            self.options
                .insert("graphics".to_string(), json!({ "quality": "medium" }));
        }

        let mut used_ids: HashSet<String> = HashSet::new();
        for club in self.league.clubs_mut() {
            if club.club_id.is_empty() {
                club.club_id = slugify_with_prefix(&club.name, "t");
            }
            let base = club.club_id.clone();
            let mut candidate = base.clone();
            let mut suffix = 1;
            while !used_ids.insert(candidate.clone()) {
                candidate = format!("{base}-{suffix}");
                suffix += 1;
            }
            club.club_id = candidate;

            if let Some(captain) = club.captain_id {
                if !club.has_player(captain) {
                    club.captain_id = None;
                }
            }
        }

        // Records written before the log carried seasons belong to the
        // season the save was in.
        let season = self.season;
        for record in self.match_log.iter_mut() {
            if record.season == 0 {
                record.season = season;
            }
        }
    }

    pub fn ledger_date(&self) -> LedgerDate {
        LedgerDate {
            season: self.season,
            week: self.calendar_week,
        }
    }

    /// Next free player id across rosters, junior offers and market
    /// snapshots.
    pub fn next_player_id(&self) -> u32 {
        let mut max_id = 0;
        for club in self.league.clubs() {
            for player in &club.players {
                max_id = max_id.max(player.id);
            }
        }
        for offers in self.junior_offers.values() {
            for offer in offers {
                max_id = max_id.max(offer.player_snapshot.id);
            }
        }
        for listing in &self.transfer_list {
            if let Some(snapshot) = &listing.player_snapshot {
                max_id = max_id.max(snapshot.id);
            }
        }
        max_id + 1
    }

    pub fn user_club(&self) -> Option<&Club> {
        let team_id = self.meta.user_team_id.as_deref()?;
        self.league.club_by_id(team_id)
    }

    /// Highest round number scheduled for any division this season.
    pub fn max_league_round(&self) -> u32 {
        self.fixtures_by_division
            .values()
            .flat_map(|fixtures| fixtures.iter().map(|m| m.round))
            .max()
            .unwrap_or(0)
    }

    /// Folds a result into the season/career statistics, appends the
    /// immutable record to the match log and refreshes the table snapshot.
    pub fn record_result(
        &mut self,
        result: &MatchResult,
        competition: Competition,
        round: u32,
    ) -> MatchRecord {
        let season = self.season;
        let GameState {
            league,
            player_stats,
            club_stats,
            player_career_stats,
            club_career_stats,
            match_log,
            table_snapshot,
            ..
        } = self;

        let fallback_home;
        let home = match league.club_by_name(&result.home) {
            Some(club) => club,
            None => {
                fallback_home = Club::new(result.home.clone());
                &fallback_home
            }
        };
        let fallback_away;
        let away = match league.club_by_name(&result.away) {
            Some(club) => club,
            None => {
                fallback_away = Club::new(result.away.clone());
                &fallback_away
            }
        };

        let record = update_stats_from_result(
            result,
            home,
            away,
            competition,
            season,
            round,
            player_stats,
            club_stats,
            player_career_stats,
            club_career_stats,
        );
        match_log.push(record.clone());
        *table_snapshot = rebuild_table_snapshot(match_log, season);
        record
    }

    /// Rebuilds the season stat maps and the table snapshot from the match
    /// log, the log being the source of truth for the running season.
    pub fn refresh_season_stats(&mut self) {
        let (player_stats, club_stats) =
            rebuild_stats_from_log(&self.match_log, self.season, &self.league);
        self.player_stats = player_stats;
        self.club_stats = club_stats;
        self.table_snapshot = rebuild_table_snapshot(&self.match_log, self.season);
    }

    /// Removes every logged record with this match id, reverting its career
    /// contribution and rebuilding the season maps from the remaining log.
    /// Returns how many records were removed.
    pub fn remove_recorded_match(&mut self, match_id: &str) -> usize {
        let mut removed: Vec<MatchRecord> = Vec::new();
        self.match_log.retain(|record| {
            if record.match_id() == match_id {
                removed.push(record.clone());
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return 0;
        }
        for record in &removed {
            self.fold_career_stats(record, false);
        }
        self.refresh_season_stats();
        removed.len()
    }

    /// Edits a logged record in place, keeping the season and career stat
    /// maps consistent with the changed events/score. Returns the updated
    /// record, or None when no record carries the id.
    pub fn amend_record(
        &mut self,
        match_id: &str,
        edit: impl FnOnce(&mut MatchRecord),
    ) -> Option<MatchRecord> {
        let index = self
            .match_log
            .iter()
            .position(|record| record.match_id() == match_id)?;
        let previous = self.match_log[index].clone();
        self.fold_career_stats(&previous, false);

        edit(&mut self.match_log[index]);

        let updated = self.match_log[index].clone();
        self.fold_career_stats(&updated, true);
        self.refresh_season_stats();
        Some(updated)
    }

    fn fold_career_stats(&mut self, record: &MatchRecord, forward: bool) {
        let GameState {
            league,
            player_career_stats,
            club_career_stats,
            ..
        } = self;

        let fallback_home;
        let home = match league.club_by_name(&record.home) {
            Some(club) => club,
            None => {
                fallback_home = Club::new(record.home.clone());
                &fallback_home
            }
        };
        let fallback_away;
        let away = match league.club_by_name(&record.away) {
            Some(club) => club,
            None => {
                fallback_away = Club::new(record.away.clone());
                &fallback_away
            }
        };

        if forward {
            apply_record_to_stats(record, home, away, player_career_stats, club_career_stats);
        } else {
            remove_record_from_stats(record, home, away, player_career_stats, club_career_stats);
        }
    }
}
