use crate::club::Trait;
use crate::error::DomainError;
use crate::state::GameState;
use crate::utils::GameRng;
use serde::{Deserialize, Serialize};

pub const TRAINING_COST_SEK: i64 = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    #[default]
    Active,
    Done,
    Cancelled,
}

/// A one-week form-training order for a single player. The fee is charged
/// up front; the form boost lands when the week completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOrder {
    pub id: u32,
    pub club_name: String,
    pub player_id: u32,
    #[serde(default = "default_weeks")]
    pub weeks_left: u32,
    #[serde(default = "default_cost")]
    pub cost_sek: i64,
    #[serde(default)]
    pub status: TrainingStatus,
    #[serde(default)]
    pub note: String,
}

fn default_weeks() -> u32 {
    1
}

fn default_cost() -> i64 {
    TRAINING_COST_SEK
}

/// Starts form training for one player, charging the fee immediately.
pub fn start_form_training(
    gs: &mut GameState,
    club_name: &str,
    player_id: u32,
) -> Result<TrainingOrder, DomainError> {
    let club = gs
        .league
        .club_by_name(club_name)
        .ok_or_else(|| DomainError::not_found(format!("Hittar ingen klubb '{club_name}'")))?;
    let club_name = club.name.clone();
    let player = club.player(player_id).ok_or_else(|| {
        DomainError::not_found(format!(
            "Hittar ingen spelare med id={player_id} i {club_name}"
        ))
    })?;
    let player_name = player.full_name();

    let already_active = gs.training_orders.iter().any(|order| {
        order.status == TrainingStatus::Active
            && order.player_id == player_id
            && order.club_name.eq_ignore_ascii_case(&club_name)
    });
    if already_active {
        return Err(DomainError::rule(format!(
            "{player_name} har redan aktiv formträning."
        )));
    }

    if club.cash_sek < TRAINING_COST_SEK {
        return Err(DomainError::rule(format!(
            "{club_name} har inte råd (behöver {TRAINING_COST_SEK} kr)."
        )));
    }

    let club = gs.league.club_by_name_mut(&club_name).expect("club exists");
    club.cash_sek -= TRAINING_COST_SEK;

    let next_id = gs
        .training_orders
        .iter()
        .map(|order| order.id)
        .max()
        .unwrap_or(0)
        + 1;
    let order = TrainingOrder {
        id: next_id,
        club_name: club_name.clone(),
        player_id,
        weeks_left: 1,
        cost_sek: TRAINING_COST_SEK,
        status: TrainingStatus::Active,
        note: String::new(),
    };
    gs.training_orders.push(order.clone());
    Ok(order)
}

/// Advances all active training orders by one week, applying the form
/// boost for orders that complete. Returns log lines for the weekly
/// report.
pub fn advance_training_week(gs: &mut GameState, rng: &mut GameRng) -> Vec<String> {
    let mut logs = Vec::new();

    let mut orders = std::mem::take(&mut gs.training_orders);
    for order in orders.iter_mut() {
        if order.status != TrainingStatus::Active {
            continue;
        }

        order.weeks_left = order.weeks_left.saturating_sub(1);
        if order.weeks_left > 0 {
            continue;
        }

        let Some(club) = gs.league.club_by_name_mut(&order.club_name) else {
            order.status = TrainingStatus::Done;
            order.note = "Spelare/klubb saknas vid slutförande.".to_string();
            continue;
        };
        let club_name = club.name.clone();
        let Some(player) = club.player_mut(order.player_id) else {
            order.status = TrainingStatus::Done;
            order.note = "Spelare/klubb saknas vid slutförande.".to_string();
            continue;
        };

        let base = rng.int(2, 5);
        let bonus = if player.has_trait(Trait::Trainable) {
            rng.int(1, 3)
        } else {
            0
        };
        let boost = (base + bonus) as u8;

        let new_form = (player.form_now + boost).clamp(1, 20);
        player.form_now = new_form;
        player.form_season = (player.form_season + 0.5 * boost as f32).min(20.0);

        let player_name = player.full_name();
        let season_form = player.form_season;
        order.status = TrainingStatus::Done;
        order.note = format!("+{boost} form (nu {new_form})");
        logs.push(format!(
            "{club_name}: {player_name} fick +{boost} form → {new_form} (säsong {season_form:.1})"
        ));
    }
    gs.training_orders = orders;

    logs
}
