use crate::club::{check_squad_limits, Club, Player};
use crate::economy::valuation::calculate_player_value;
use crate::error::DomainError;
use crate::league::club_table_position;
use crate::state::GameState;
use log::debug;

#[derive(Debug, Clone)]
pub struct BidOutcome {
    pub accepted: bool,
    pub message: String,
    pub player_id: Option<u32>,
}

/// Seller acceptance policy: a threshold on `offer / market value`,
/// starting at 1.05 and adjusted by table position, cash situation, squad
/// size and how much the player stands out, floored at 0.85.
fn seller_accepts(
    gs: &GameState,
    seller: &Club,
    player: &Player,
    offer: i64,
    value: i64,
) -> (bool, String) {
    let (position, total) = club_table_position(&gs.league.divisions, &gs.table_snapshot, &seller.name);
    let ratio = position as f64 / total.max(1) as f64;

    let mut threshold: f64 = 1.05;
    if ratio <= 0.25 {
        threshold += 0.35;
    } else if ratio <= 0.5 {
        threshold += 0.15;
    } else if ratio >= 0.9 {
        threshold -= 0.15;
    }

    let cash = seller.cash_sek;
    if cash < value {
        threshold -= 0.10;
    }
    if cash < offer / 2 {
        threshold -= 0.10;
    }
    if cash > 7_500_000 {
        threshold += 0.05;
    }

    let roster = seller.players.len();
    if roster <= 14 {
        threshold += 0.15;
    } else if roster >= 23 {
        threshold -= 0.05;
    }

    let avg_skill = seller.average_skill();
    if player.skill_open as f64 >= avg_skill + 2.0 {
        threshold += 0.10;
    } else if player.skill_open as f64 <= avg_skill - 1.0 {
        threshold -= 0.05;
    }

    let threshold = threshold.max(0.85);
    let offer_ratio = offer as f64 / value.max(1) as f64;
    if offer_ratio >= threshold {
        return (true, "budet var tillräckligt högt".to_string());
    }

    let mut reason = format!(
        "kräver minst {threshold:.2}× värdet ({value} kr) men budet var {offer_ratio:.2}×"
    );
    if roster <= 14 {
        reason.push_str(", truppen är för tunn");
    } else if ratio <= 0.5 {
        reason.push_str(", klubben jagar topplacering");
    }
    (false, reason)
}

/// Submits a transfer bid for `player_id`. `offer` defaults to 110% of
/// market value. An accepted bid moves the player, settles the cash
/// exactly and scrubs every seller-side reference to the player.
pub fn submit_transfer_bid(
    gs: &mut GameState,
    buyer_name: &str,
    player_id: u32,
    offer: Option<i64>,
) -> Result<BidOutcome, DomainError> {
    let buyer = gs
        .league
        .club_by_name(buyer_name)
        .ok_or_else(|| DomainError::not_found(format!("Hittar ingen klubb '{buyer_name}'.")))?;
    let buyer_name = buyer.name.clone();

    let (seller_name, player) = gs
        .league
        .find_player(player_id)
        .map(|(club, player)| (club.name.clone(), player.clone()))
        .ok_or_else(|| {
            DomainError::not_found(format!("Spelare med id={player_id} hittades inte i ligan."))
        })?;

    if seller_name == buyer_name {
        return Err(DomainError::rule(
            "En klubb kan inte lägga bud på sin egen spelare.".to_string(),
        ));
    }

    let market_value = calculate_player_value(&player, gs.player_stats.get(&player_id));
    let offer = offer.unwrap_or_else(|| ((market_value as f64 * 1.1) as i64).max(50_000));
    if offer <= 0 {
        return Err(DomainError::invalid_input("Budet måste vara positivt.".to_string()));
    }

    let buyer = gs.league.club_by_name(&buyer_name).expect("buyer exists");
    if buyer.cash_sek < offer {
        return Err(DomainError::rule(format!(
            "{} saknar pengar ({} kr krävs).",
            buyer_name, offer
        )));
    }

    check_squad_limits(buyer, &[&player], &[])?;
    let seller = gs.league.club_by_name(&seller_name).expect("seller exists");
    check_squad_limits(seller, &[], &[player_id])?;

    let (accepted, reason) = seller_accepts(gs, seller, &player, offer, market_value);
    if !accepted {
        let message = format!(
            "{} avböjde budet på {} kr för {}: {}.",
            seller_name,
            offer,
            player.full_name(),
            reason
        );
        debug!("bids: {}", message);
        return Ok(BidOutcome {
            accepted: false,
            message,
            player_id: None,
        });
    }

    let seller = gs.league.club_by_name_mut(&seller_name).expect("seller exists");
    let mut moved = seller.take_player(player_id).expect("player exists");
    seller.cash_sek += offer;

    moved.value_sek = calculate_player_value(&moved, gs.player_stats.get(&player_id));
    let message = format!(
        "{} värvade {} från {} för {} kr",
        buyer_name,
        moved.full_name(),
        seller_name,
        offer
    );

    let buyer = gs.league.club_by_name_mut(&buyer_name).expect("buyer exists");
    buyer.players.push(moved);
    buyer.cash_sek -= offer;

    gs.transfer_list.retain(|listing| listing.player_id != Some(player_id));

    debug!("bids: {}", message);
    Ok(BidOutcome {
        accepted: true,
        message,
        player_id: Some(player_id),
    })
}
