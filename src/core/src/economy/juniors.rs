use crate::club::{check_squad_limits, Player};
use crate::economy::valuation::calculate_player_value;
use crate::error::DomainError;
use crate::generator::{generate_player, random_position};
use crate::state::GameState;
use crate::utils::GameRng;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A youth prospect offered to one club, valid until `expires_season`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JuniorOffer {
    pub club_name: String,
    pub price_sek: i64,
    pub player_snapshot: Player,
    pub expires_season: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn generate_junior(next_id: u32, rng: &mut GameRng) -> Player {
    let age_roll = rng.float();
    let age = if age_roll < 0.6 {
        rng.int(17, 18)
    } else if age_roll < 0.9 {
        rng.int(16, 19)
    } else {
        20
    } as u8;
    let skill = rng.gauss(4.5, 1.8).round().clamp(2.0, 12.0) as u8;

    let mut player = generate_player(next_id, random_position(rng), rng);
    player.age = age;
    player.skill_open = skill;
    player.skill_hidden = rng.int(30, 80) as u8;
    player.value_sek = calculate_player_value(&player, None);
    player
}

/// Rolls `count` fresh offers for one club, replacing its current batch.
pub fn generate_junior_offers(
    gs: &mut GameState,
    club_name: &str,
    count: usize,
    rng: &mut GameRng,
) -> Vec<JuniorOffer> {
    let mut next_id = gs.next_player_id();
    let expires = gs.season + 1;
    let mut offers = Vec::with_capacity(count.max(1));
    for _ in 0..count.max(1) {
        let player = generate_junior(next_id, rng);
        next_id += 1;
        let price = (calculate_player_value(&player, None) as f64 * 0.6) as i64;
        offers.push(JuniorOffer {
            club_name: club_name.to_string(),
            price_sek: price,
            player_snapshot: player,
            expires_season: expires,
            tags: vec!["junior".to_string()],
        });
    }
    gs.junior_offers.insert(club_name.to_string(), offers.clone());
    offers
}

/// Prunes expired offers and rolls 1-3 fresh prospects for every club,
/// as part of the season rollover.
pub fn roll_new_junior_offers(gs: &mut GameState, rng: &mut GameRng) {
    let season = gs.season;
    let mut cleaned: HashMap<String, Vec<JuniorOffer>> = HashMap::new();
    for (club_name, offers) in gs.junior_offers.drain() {
        let valid: Vec<JuniorOffer> = offers
            .into_iter()
            .filter(|offer| offer.expires_season >= season)
            .collect();
        if !valid.is_empty() {
            cleaned.insert(club_name, valid);
        }
    }
    gs.junior_offers = cleaned;

    let club_names: Vec<String> = gs.league.clubs().map(|club| club.name.clone()).collect();
    for club_name in club_names {
        let count = rng.int(1, 3) as usize;
        generate_junior_offers(gs, &club_name, count, rng);
        debug!("juniors: rolled {} offers for {}", count, club_name);
    }
}

/// Accepts the junior offer at `index`: charges the club, adds the player
/// and enforces the squad limits.
pub fn accept_junior_offer(
    gs: &mut GameState,
    club_name: &str,
    index: usize,
) -> Result<u32, DomainError> {
    let club = gs
        .league
        .club_by_name(club_name)
        .ok_or_else(|| DomainError::not_found(format!("Hittar ingen klubb '{club_name}'.")))?;
    let club_name = club.name.clone();

    let offers = gs.junior_offers.get(&club_name).cloned().unwrap_or_default();
    if index >= offers.len() {
        return Err(DomainError::not_found("Ogiltigt juniorerbjudande.".to_string()));
    }
    let offer = offers[index].clone();

    let club = gs.league.club_by_name(&club_name).expect("club exists");
    if club.cash_sek < offer.price_sek {
        return Err(DomainError::rule(format!(
            "{} saknar pengar ({} kr krävs).",
            club_name, offer.price_sek
        )));
    }

    let mut player = offer.player_snapshot.clone();
    check_squad_limits(club, &[&player], &[])?;

    player.value_sek = calculate_player_value(&player, None);
    let player_id = player.id;

    let club = gs.league.club_by_name_mut(&club_name).expect("club exists");
    club.cash_sek -= offer.price_sek;
    club.players.push(player);

    let remaining: Vec<JuniorOffer> = offers
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, offer)| offer)
        .collect();
    gs.junior_offers.insert(club_name.clone(), remaining);

    debug!("juniors: {} signed prospect {}", club_name, player_id);
    Ok(player_id)
}
