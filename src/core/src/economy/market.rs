use crate::club::{check_squad_limits, Player};
use crate::economy::valuation::calculate_player_value;
use crate::error::DomainError;
use crate::generator::{generate_player, random_position};
use crate::state::GameState;
use crate::utils::GameRng;
use log::debug;
use serde::{Deserialize, Serialize};

pub const MIN_LISTINGS: usize = 10;
const FREE_AGENT_PROBABILITY: f64 = 0.3;
const SELLABLE_SKILL_FLOOR: u8 = 4;

/// A player offered on the transfer market. Free agents carry a full
/// player snapshot; club listings reference the owning club by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferListing {
    #[serde(default)]
    pub player_id: Option<u32>,
    #[serde(default)]
    pub club_name: Option<String>,
    pub price_sek: i64,
    #[serde(default)]
    pub player_snapshot: Option<Player>,
    #[serde(default)]
    pub note: String,
}

impl TransferListing {
    pub fn is_free_agent(&self) -> bool {
        self.player_snapshot.is_some()
    }
}

fn create_free_agent_listing(next_id: u32, rng: &mut GameRng) -> TransferListing {
    let age = rng.int(22, 30) as u8;
    let skill = rng.gauss(6.0, 1.5).round().clamp(3.0, 12.0) as u8;
    let position = random_position(rng);
    let mut player = generate_player(next_id, position, rng);
    player.age = age;
    player.skill_open = skill;
    player.value_sek = calculate_player_value(&player, None);

    TransferListing {
        player_id: Some(player.id),
        club_name: None,
        price_sek: player.value_sek,
        player_snapshot: Some(player),
        note: "fri agent".to_string(),
    }
}

/// Prunes dead listings and tops the market back up to `MIN_LISTINGS`,
/// mixing free agents with club sales.
pub fn refresh_transfer_market(gs: &mut GameState, rng: &mut GameRng) {
    let mut listings: Vec<TransferListing> = Vec::new();
    for listing in gs.transfer_list.drain(..) {
        if listing.is_free_agent() {
            listings.push(listing);
            continue;
        }
        let alive = listing
            .club_name
            .as_deref()
            .and_then(|name| gs.league.club_by_name(name))
            .map(|club| {
                listing
                    .player_id
                    .map(|pid| club.has_player(pid))
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if alive {
            listings.push(listing);
        }
    }

    let club_names: Vec<String> = gs.league.clubs().map(|club| club.name.clone()).collect();
    let mut next_id = gs.next_player_id();

    let mut attempts = 0;
    while listings.len() < MIN_LISTINGS && attempts < MIN_LISTINGS * 3 {
        attempts += 1;

        if rng.chance(FREE_AGENT_PROBABILITY) {
            let listing = create_free_agent_listing(next_id, rng);
            next_id += 1;
            listings.push(listing);
            continue;
        }

        let Some(club_name) = rng.pick(&club_names).cloned() else {
            continue;
        };
        let Some(club) = gs.league.club_by_name(&club_name) else {
            continue;
        };
        let sellable: Vec<&Player> = club
            .players
            .iter()
            .filter(|p| p.skill_open >= SELLABLE_SKILL_FLOOR)
            .collect();
        let Some(player) = rng.pick(&sellable) else {
            continue;
        };
        let already_listed = listings.iter().any(|l| {
            !l.is_free_agent()
                && l.player_id == Some(player.id)
                && l.club_name.as_deref() == Some(club.name.as_str())
        });
        if already_listed {
            continue;
        }
        let price = player.value_sek.max(150_000);
        listings.push(TransferListing {
            player_id: Some(player.id),
            club_name: Some(club.name.clone()),
            price_sek: (price as f64 * rng.uniform(0.9, 1.2)).round() as i64,
            player_snapshot: None,
            note: "klubbförsäljning".to_string(),
        });
    }

    gs.transfer_list = listings;
}

/// Buys the listing at `index` for `buyer_name`. Free agents materialise
/// from their snapshot; club sales settle cash on both sides.
pub fn purchase_listing(
    gs: &mut GameState,
    buyer_name: &str,
    index: usize,
) -> Result<(String, u32), DomainError> {
    if index >= gs.transfer_list.len() {
        return Err(DomainError::not_found("Ogiltigt transferindex."));
    }
    let listing = gs.transfer_list[index].clone();
    let price = listing.price_sek;

    let buyer = gs
        .league
        .club_by_name(buyer_name)
        .ok_or_else(|| DomainError::not_found(format!("Hittar ingen klubb '{buyer_name}'.")))?;
    let buyer_name = buyer.name.clone();
    if buyer.cash_sek < price {
        return Err(DomainError::rule(format!(
            "{} saknar pengar ({} kr krävs).",
            buyer_name, price
        )));
    }

    if let Some(snapshot) = listing.player_snapshot {
        let mut player = snapshot;
        check_squad_limits(gs.league.club_by_name(&buyer_name).expect("buyer exists"), &[&player], &[])?;
        player.value_sek = calculate_player_value(&player, None);
        let player_id = player.id;
        let message = format!(
            "{} skrev kontrakt med {} (fri agent)",
            buyer_name,
            player.full_name()
        );

        let buyer = gs.league.club_by_name_mut(&buyer_name).expect("buyer exists");
        buyer.players.push(player);
        buyer.cash_sek -= price;
        gs.transfer_list.remove(index);
        debug!("market: {}", message);
        return Ok((message, player_id));
    }

    let seller_name = listing
        .club_name
        .clone()
        .ok_or_else(|| DomainError::rule("Säljarklubben finns inte längre.".to_string()))?;
    let seller = gs
        .league
        .club_by_name(&seller_name)
        .ok_or_else(|| DomainError::rule("Säljarklubben finns inte längre.".to_string()))?;
    if seller.name == buyer_name {
        return Err(DomainError::rule(
            "En klubb kan inte köpa sin egen spelare.".to_string(),
        ));
    }
    let player_id = listing
        .player_id
        .ok_or_else(|| DomainError::rule("Spelaren finns inte längre i säljarklubben.".to_string()))?;
    let player = seller.player(player_id).cloned().ok_or_else(|| {
        DomainError::rule("Spelaren finns inte längre i säljarklubben.".to_string())
    })?;

    check_squad_limits(gs.league.club_by_name(&buyer_name).expect("buyer exists"), &[&player], &[])?;
    check_squad_limits(gs.league.club_by_name(&seller_name).expect("seller exists"), &[], &[player_id])?;

    let seller = gs.league.club_by_name_mut(&seller_name).expect("seller exists");
    let mut player = seller.take_player(player_id).expect("player exists");
    seller.cash_sek += price;

    player.value_sek = calculate_player_value(&player, None);
    let message = format!(
        "{} köpte {} från {}",
        buyer_name,
        player.full_name(),
        seller_name
    );

    let buyer = gs.league.club_by_name_mut(&buyer_name).expect("buyer exists");
    buyer.players.push(player);
    buyer.cash_sek -= price;
    gs.transfer_list.remove(index);
    debug!("market: {}", message);
    Ok((message, player_id))
}

/// Bot buyers sweep the market: any club with comfortable cash headroom
/// may snap up a listing at a small per-week probability.
pub fn evaluate_bot_signings(gs: &mut GameState, rng: &mut GameRng) -> Vec<String> {
    let mut logs = Vec::new();
    let mut index = 0;

    while index < gs.transfer_list.len() {
        let listing = gs.transfer_list[index].clone();
        let candidates: Vec<String> = gs
            .league
            .clubs()
            .filter(|club| listing.club_name.as_deref() != Some(club.name.as_str()))
            .filter(|club| club.cash_sek as f64 > listing.price_sek as f64 * 1.3)
            .map(|club| club.name.clone())
            .collect();

        if !candidates.is_empty() {
            let chance = if listing.is_free_agent() { 0.08 } else { 0.04 };
            if rng.chance(chance) {
                let buyer = rng.pick(&candidates).cloned().expect("non-empty candidates");
                match purchase_listing(gs, &buyer, index) {
                    Ok((message, _)) => {
                        logs.push(message);
                        continue;
                    }
                    Err(err) => {
                        debug!("market: bot purchase failed: {err}");
                        continue;
                    }
                }
            }
        }
        index += 1;
    }
    logs
}
