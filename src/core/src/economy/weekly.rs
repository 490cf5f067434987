use crate::economy::ledger::LedgerEntry;
use crate::economy::market::{evaluate_bot_signings, refresh_transfer_market};
use crate::economy::valuation::calculate_player_value;
use crate::error::DomainError;
use crate::state::GameState;
use crate::utils::GameRng;
use log::debug;

pub const WEEKLY_BASE_INCOME: i64 = 600_000;

/// Recomputes the market value of every player in the league from the
/// current season statistics.
pub fn update_player_values(gs: &mut GameState) {
    let stats = std::mem::take(&mut gs.player_stats);
    for club in gs.league.clubs_mut() {
        for player in club.players.iter_mut() {
            player.value_sek = calculate_player_value(player, stats.get(&player.id));
        }
    }
    gs.player_stats = stats;
}

/// Credits every club with the weekly sponsor income and records one
/// ledger entry per club.
pub fn apply_weekly_finances(gs: &mut GameState, base_income: i64) -> Vec<String> {
    let date = gs.ledger_date();
    let mut logs = Vec::new();
    let mut entries = Vec::new();

    for club in gs.league.clubs_mut() {
        club.cash_sek += base_income;
        logs.push(format!("{}: +{} kr i sponsorbidrag", club.name, base_income));
        entries.push(LedgerEntry::income(
            date,
            Some(club.club_id.clone()),
            club.name.clone(),
            "weekly_sponsor",
            base_income,
        ));
    }
    gs.economy_ledger.extend(entries);
    logs
}

/// The full weekly economy cycle: sponsor income, market refresh, bot
/// signings and revaluation.
pub fn process_weekly_economy(gs: &mut GameState, base_income: i64, rng: &mut GameRng) -> Vec<String> {
    let mut logs = apply_weekly_finances(gs, base_income);
    refresh_transfer_market(gs, rng);
    logs.extend(evaluate_bot_signings(gs, rng));
    update_player_values(gs);
    debug!("economy: weekly cycle done, {} log lines", logs.len());
    logs
}

/// One-off sponsor activity income for a single club.
pub fn award_sponsor_activity(
    gs: &mut GameState,
    club_name: &str,
    amount: i64,
) -> Result<String, DomainError> {
    let date = gs.ledger_date();
    let club = gs
        .league
        .club_by_name_mut(club_name)
        .ok_or_else(|| DomainError::not_found(format!("Hittade ingen klubb med namn '{club_name}'.")))?;

    club.cash_sek += amount;
    let entry = LedgerEntry::income(
        date,
        Some(club.club_id.clone()),
        club.name.clone(),
        "sponsor_activity",
        amount,
    );
    let message = format!("{} erhöll {} kr från sponsoraktivitet.", club.name, amount);
    gs.economy_ledger.push(entry);
    Ok(message)
}
