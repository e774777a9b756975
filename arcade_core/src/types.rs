//! Core domain types for the Pocket Arcade shell.
//!
//! This module defines the fundamental types used throughout the system:
//! - The player profile (the single root aggregate)
//! - Avatar customization and inventory
//! - Per-game statistics
//! - Achievement definitions and derived progress
//! - Shop, daily-reward and leaderboard types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Game Identity
// ============================================================================

/// The three built-in minigames
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    ObbyRush,
    MemoryMatch,
    DodgeMaster,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::ObbyRush, GameId::MemoryMatch, GameId::DodgeMaster];

    /// Stable identifier used in CSV archives and CLI arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::ObbyRush => "obby_rush",
            GameId::MemoryMatch => "memory_match",
            GameId::DodgeMaster => "dodge_master",
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GameId::ObbyRush => "Obby Rush",
            GameId::MemoryMatch => "Memory Match",
            GameId::DodgeMaster => "Dodge Master",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "obby_rush" | "obbyrush" => Ok(GameId::ObbyRush),
            "memory_match" | "memorymatch" => Ok(GameId::MemoryMatch),
            "dodge_master" | "dodgemaster" => Ok(GameId::DodgeMaster),
            other => Err(crate::Error::Other(format!("unknown game: {}", other))),
        }
    }
}

// ============================================================================
// Avatar and Inventory
// ============================================================================

/// Avatar customization record, replaced wholesale by the avatar screen.
///
/// Values are string identifiers offered by the UI; the engine performs no
/// ownership validation on them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvatarCustomization {
    pub skin_tone: String,
    pub face: String,
    pub hair_style: String,
    pub hair_color: String,
    pub outfit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

/// Inventory collection selector
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Hats,
    Outfits,
    Faces,
    Effects,
}

impl FromStr for ItemCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "hats" | "hat" => Ok(ItemCategory::Hats),
            "outfits" | "outfit" => Ok(ItemCategory::Outfits),
            "faces" | "face" => Ok(ItemCategory::Faces),
            "effects" | "effect" => Ok(ItemCategory::Effects),
            other => Err(crate::Error::Other(format!("unknown category: {}", other))),
        }
    }
}

/// Owned item identifiers, one collection per category.
///
/// Identifiers are unique per collection at the product level; the engine
/// trusts callers to pre-check ownership before purchasing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inventory {
    pub hats: Vec<String>,
    pub outfits: Vec<String>,
    pub faces: Vec<String>,
    pub effects: Vec<String>,
}

impl Inventory {
    pub fn collection(&self, category: ItemCategory) -> &Vec<String> {
        match category {
            ItemCategory::Hats => &self.hats,
            ItemCategory::Outfits => &self.outfits,
            ItemCategory::Faces => &self.faces,
            ItemCategory::Effects => &self.effects,
        }
    }

    pub fn collection_mut(&mut self, category: ItemCategory) -> &mut Vec<String> {
        match category {
            ItemCategory::Hats => &mut self.hats,
            ItemCategory::Outfits => &mut self.outfits,
            ItemCategory::Faces => &mut self.faces,
            ItemCategory::Effects => &mut self.effects,
        }
    }

    pub fn total_items(&self) -> u32 {
        (self.hats.len() + self.outfits.len() + self.faces.len() + self.effects.len()) as u32
    }

    pub fn owns(&self, category: ItemCategory, item_id: &str) -> bool {
        self.collection(category).iter().any(|i| i == item_id)
    }
}

/// Spendable currency selector
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Coins,
    Gems,
}

impl FromStr for Currency {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "coins" => Ok(Currency::Coins),
            "gems" => Ok(Currency::Gems),
            other => Err(crate::Error::Other(format!("unknown currency: {}", other))),
        }
    }
}

// ============================================================================
// Game Statistics
// ============================================================================

/// Running aggregates for one minigame
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStats {
    /// Running maximum score
    pub high_score: u32,
    /// Running count of finished games
    pub games_played: u32,
    /// Running sum of coins earned in this game
    pub total_coins: u32,
}

/// Per-game statistics, one slot per minigame
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStatsTable {
    pub obby_rush: GameStats,
    pub memory_match: GameStats,
    pub dodge_master: GameStats,
}

impl GameStatsTable {
    pub fn get(&self, game: GameId) -> &GameStats {
        match game {
            GameId::ObbyRush => &self.obby_rush,
            GameId::MemoryMatch => &self.memory_match,
            GameId::DodgeMaster => &self.dodge_master,
        }
    }

    pub fn get_mut(&mut self, game: GameId) -> &mut GameStats {
        match game {
            GameId::ObbyRush => &mut self.obby_rush,
            GameId::MemoryMatch => &mut self.memory_match,
            GameId::DodgeMaster => &mut self.dodge_master,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameId, &GameStats)> {
        GameId::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}

// ============================================================================
// Profile (root aggregate)
// ============================================================================

/// The canonical player profile, one per device.
///
/// Every mutation is a read-modify-write of the whole aggregate; partial
/// field-level persistence does not exist. Invariants maintained by the
/// progression operations:
/// - `xp < xp_per_level * level` after every mutation
/// - `energy <= max_energy`
/// - `achievements` only ever grows
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub avatar: AvatarCustomization,
    pub level: u32,
    pub xp: u32,
    pub coins: u32,
    pub gems: u32,
    pub energy: u32,
    pub max_energy: u32,
    pub last_energy_update: DateTime<Utc>,
    pub inventory: Inventory,
    pub achievements: Vec<String>,
    pub game_stats: GameStatsTable,
    pub daily_streak: u32,
    #[serde(default)]
    pub last_login_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Sum of coins earned across all games (the `coin_collector` aggregate;
    /// distinct from the spendable balance)
    pub fn total_coins_collected(&self) -> u32 {
        self.game_stats.iter().map(|(_, s)| s.total_coins).sum()
    }

    /// Total finished games across all minigames
    pub fn total_games_played(&self) -> u32 {
        self.game_stats.iter().map(|(_, s)| s.games_played).sum()
    }

    /// Items bought from the shop: inventory size minus the items every
    /// fresh profile starts with
    pub fn items_purchased(&self) -> u32 {
        self.inventory
            .total_items()
            .saturating_sub(crate::catalog::DEFAULT_ITEM_COUNT)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }

    /// XP still needed to reach the next level
    pub fn xp_to_next_level(&self, xp_per_level: u32) -> u32 {
        (xp_per_level * self.level).saturating_sub(self.xp)
    }
}

// ============================================================================
// Achievements
// ============================================================================

/// Which profile aggregate an achievement measures.
///
/// Progress display and the unlock predicate both go through [`Self::metric`],
/// so the two can never drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementKind {
    /// Total games finished across all minigames
    GamesPlayed,
    /// Total coins earned in games (not the spendable balance)
    CoinsCollected,
    /// Current profile level
    Level,
    /// Consecutive-day login streak
    DailyStreak,
    /// High score in one specific game
    HighScore(GameId),
    /// Shop items bought (inventory minus default-granted items)
    ItemsPurchased,
}

impl AchievementKind {
    /// Extract the measured aggregate from a profile
    pub fn metric(&self, profile: &Profile) -> u32 {
        match self {
            AchievementKind::GamesPlayed => profile.total_games_played(),
            AchievementKind::CoinsCollected => profile.total_coins_collected(),
            AchievementKind::Level => profile.level,
            AchievementKind::DailyStreak => profile.daily_streak,
            AchievementKind::HighScore(game) => profile.game_stats.get(*game).high_score,
            AchievementKind::ItemsPurchased => profile.items_purchased(),
        }
    }
}

/// Reward credited when an achievement unlocks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AchievementReward {
    pub coins: u32,
    pub gems: u32,
    pub xp: u32,
}

/// A static achievement definition from the catalog
#[derive(Clone, Debug)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub reward: AchievementReward,
    pub requirement: u32,
    pub kind: AchievementKind,
}

/// An achievement definition annotated with the player's current progress.
///
/// Recomputed on demand from the profile; never persisted.
#[derive(Clone, Debug)]
pub struct AchievementProgress {
    pub definition: AchievementDef,
    pub progress: u32,
    pub unlocked: bool,
}

// ============================================================================
// Shop and Daily Rewards
// ============================================================================

/// A purchasable cosmetic item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub price: u32,
    pub currency: Currency,
    pub preview: String,
}

/// One day in the 7-day login reward table
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DailyReward {
    pub day: u32,
    pub coins: u32,
    pub gems: u32,
    pub energy: u32,
}

// ============================================================================
// Leaderboard
// ============================================================================

/// One row of the (client-side mock) leaderboard
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub avatar: AvatarCustomization,
    pub score: u32,
    pub rank: u32,
}

// ============================================================================
// Game Sessions
// ============================================================================

/// A journaled record of one finished game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    pub id: Uuid,
    pub game: GameId,
    pub score: u32,
    pub coins_earned: u32,
    pub xp_earned: u32,
    pub played_at: DateTime<Utc>,
}
