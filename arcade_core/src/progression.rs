//! Progression rules: XP/level arithmetic, energy regeneration, daily
//! streaks, currency and inventory transitions.
//!
//! Everything here is a pure transition over [`Profile`]; the engine applies
//! these against the latest committed profile and handles persistence. Each
//! function either completes its whole transition or leaves the profile
//! untouched.

use crate::types::{Currency, GameId, ItemCategory, Profile};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Credit XP and normalize the level counter.
///
/// The threshold for clearing level N is `xp_per_level * N`, so requirements
/// grow linearly. After normalization `xp < xp_per_level * level` holds and
/// `level` has only increased.
pub fn apply_xp(profile: &mut Profile, amount: u32, xp_per_level: u32) {
    profile.xp += amount;

    while (profile.xp as u64) >= (xp_per_level as u64) * (profile.level as u64) {
        profile.xp -= xp_per_level * profile.level;
        profile.level += 1;
        tracing::debug!("Level up: now level {}", profile.level);
    }
}

/// Credit whole energy units for wall-clock time elapsed since the last
/// reconciliation.
///
/// Only complete refill periods are consumed: the watermark advances by
/// exactly the periods that were turned into energy, so partial progress
/// toward the next unit survives across reconciliations. Once the clamp
/// hits `max_energy` the watermark snaps to `now` (there is no next unit to
/// make progress toward).
///
/// Returns true if the profile changed.
pub fn reconcile_energy(profile: &mut Profile, now: DateTime<Utc>, refill_minutes: u32) -> bool {
    if profile.energy >= profile.max_energy {
        return false;
    }

    let refill = Duration::minutes(refill_minutes as i64);
    let elapsed = now - profile.last_energy_update;
    if elapsed < refill {
        return false;
    }

    // Units capped at max_energy: anything larger is clamped below anyway,
    // and the cap keeps the i64 -> u32 cast safe on a years-stale watermark.
    let units = (elapsed.num_milliseconds() / refill.num_milliseconds())
        .min(profile.max_energy as i64) as u32;

    let new_energy = (profile.energy + units).min(profile.max_energy);
    profile.last_energy_update = if new_energy == profile.max_energy {
        now
    } else {
        profile.last_energy_update + refill * units as i32
    };
    profile.energy = new_energy;

    tracing::debug!(
        "Energy reconciled: {}/{} after {} unit(s)",
        profile.energy,
        profile.max_energy,
        units
    );
    true
}

/// Advance the consecutive-login streak when the calendar day changed.
///
/// A login the day after the last recorded one extends the streak; any
/// longer gap (or a fresh profile) resets it to 1. Pure date comparison,
/// no timezone handling beyond what the caller's `today` encodes.
///
/// Returns true if the profile changed.
pub fn reconcile_daily_login(profile: &mut Profile, today: NaiveDate) -> bool {
    if profile.last_login_date == Some(today) {
        return false;
    }

    let consecutive = match (profile.last_login_date, today.pred_opt()) {
        (Some(last), Some(yesterday)) => last == yesterday,
        _ => false,
    };

    profile.daily_streak = if consecutive {
        profile.daily_streak + 1
    } else {
        1
    };
    profile.last_login_date = Some(today);

    tracing::info!("Daily login: streak is now {}", profile.daily_streak);
    true
}

/// Spend energy if the balance covers the full amount.
///
/// Returns false (and mutates nothing) on insufficient energy; there is no
/// partial spend.
pub fn spend_energy(profile: &mut Profile, amount: u32) -> bool {
    if profile.energy < amount {
        return false;
    }
    profile.energy -= amount;
    true
}

/// Fold one finished game into that game's running aggregates
pub fn record_game_result(profile: &mut Profile, game: GameId, score: u32, coins_earned: u32) {
    let stats = profile.game_stats.get_mut(game);
    stats.high_score = stats.high_score.max(score);
    stats.games_played += 1;
    stats.total_coins += coins_earned;
}

/// Debit the named currency and append the item to its inventory collection.
///
/// Returns false (and mutates nothing) when the balance does not cover the
/// price. Ownership is not checked here; callers pre-check it.
pub fn purchase(
    profile: &mut Profile,
    item_id: &str,
    category: ItemCategory,
    price: u32,
    currency: Currency,
) -> bool {
    let balance = match currency {
        Currency::Coins => &mut profile.coins,
        Currency::Gems => &mut profile.gems,
    };
    if *balance < price {
        return false;
    }
    *balance -= price;
    profile
        .inventory
        .collection_mut(category)
        .push(item_id.to_string());
    true
}

/// Credit a daily reward; the energy portion is capped at `max_energy`
pub fn claim_daily_reward(profile: &mut Profile, coins: u32, gems: u32, energy: u32) {
    profile.coins += coins;
    profile.gems += gems;
    profile.energy = (profile.energy + energy).min(profile.max_energy);
}
