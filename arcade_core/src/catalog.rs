//! Static content catalog: achievements, shop items, daily rewards and
//! avatar options.
//!
//! This module provides the built-in content for the shell. Nothing here is
//! persisted; achievement progress is always recomputed from the profile.

use crate::types::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

/// XP needed to clear level N is `XP_PER_LEVEL * N`
pub const XP_PER_LEVEL: u32 = 100;

/// Minutes of wall-clock time per regenerated energy unit
pub const ENERGY_REFILL_MINUTES: u32 = 10;

/// Energy ceiling for a fresh profile
pub const MAX_ENERGY: u32 = 5;

/// Starting balances for a fresh profile
pub const STARTING_COINS: u32 = 1000;
pub const STARTING_GEMS: u32 = 50;

/// Items granted to every fresh profile (2 outfits + 3 faces); the
/// `shopaholic` aggregate subtracts these from the inventory size
pub const DEFAULT_ITEM_COUNT: u32 = 5;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in content
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// Avatar option offered by the creator screen
#[derive(Clone, Debug)]
pub struct AvatarChoice {
    pub id: String,
    pub name: String,
    pub free: bool,
}

/// The option lists the avatar-creator screen renders
#[derive(Clone, Debug)]
pub struct AvatarOptions {
    pub skin_tones: Vec<String>,
    pub faces: Vec<AvatarChoice>,
    pub hair_styles: Vec<AvatarChoice>,
    pub hair_colors: Vec<String>,
    pub outfits: Vec<AvatarChoice>,
}

/// The complete static content catalog
#[derive(Clone, Debug)]
pub struct Catalog {
    pub achievements: Vec<AchievementDef>,
    pub shop_items: Vec<ShopItem>,
    pub daily_rewards: Vec<DailyReward>,
    pub avatar_options: AvatarOptions,
}

fn choice(id: &str, name: &str, free: bool) -> AvatarChoice {
    AvatarChoice {
        id: id.into(),
        name: name.into(),
        free,
    }
}

fn shop_item(
    id: &str,
    name: &str,
    category: ItemCategory,
    price: u32,
    currency: Currency,
    preview: &str,
) -> ShopItem {
    ShopItem {
        id: id.into(),
        name: name.into(),
        category,
        price,
        currency,
        preview: preview.into(),
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    // ========================================================================
    // Achievements
    // ========================================================================

    let achievements = vec![
        AchievementDef {
            id: "first_game".into(),
            name: "First Steps".into(),
            description: "Play your first game".into(),
            icon: "🎮".into(),
            reward: AchievementReward {
                coins: 100,
                gems: 0,
                xp: 50,
            },
            requirement: 1,
            kind: AchievementKind::GamesPlayed,
        },
        AchievementDef {
            id: "coin_collector".into(),
            name: "Coin Collector".into(),
            description: "Collect 1000 total coins".into(),
            icon: "🪙".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 5,
                xp: 100,
            },
            requirement: 1000,
            kind: AchievementKind::CoinsCollected,
        },
        AchievementDef {
            id: "level_10".into(),
            name: "Rising Star".into(),
            description: "Reach level 10".into(),
            icon: "⭐".into(),
            reward: AchievementReward {
                coins: 500,
                gems: 10,
                xp: 0,
            },
            requirement: 10,
            kind: AchievementKind::Level,
        },
        AchievementDef {
            id: "daily_champion".into(),
            name: "Daily Champion".into(),
            description: "Complete a 7-day streak".into(),
            icon: "🔥".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 25,
                xp: 200,
            },
            requirement: 7,
            kind: AchievementKind::DailyStreak,
        },
        AchievementDef {
            id: "obby_master".into(),
            name: "Obby Master".into(),
            description: "Score 1000 in Obby Rush".into(),
            icon: "🏃".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 15,
                xp: 150,
            },
            requirement: 1000,
            kind: AchievementKind::HighScore(GameId::ObbyRush),
        },
        AchievementDef {
            id: "memory_genius".into(),
            name: "Memory Genius".into(),
            description: "Score 30 in Memory Match".into(),
            icon: "🧠".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 15,
                xp: 150,
            },
            requirement: 30,
            kind: AchievementKind::HighScore(GameId::MemoryMatch),
        },
        AchievementDef {
            id: "dodge_expert".into(),
            name: "Dodge Expert".into(),
            description: "Survive 60 seconds in Dodge Master".into(),
            icon: "⚡".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 15,
                xp: 150,
            },
            requirement: 60,
            kind: AchievementKind::HighScore(GameId::DodgeMaster),
        },
        AchievementDef {
            id: "shopaholic".into(),
            name: "Shopaholic".into(),
            description: "Purchase 5 items from the shop".into(),
            icon: "🛍️".into(),
            reward: AchievementReward {
                coins: 0,
                gems: 10,
                xp: 100,
            },
            requirement: 5,
            kind: AchievementKind::ItemsPurchased,
        },
    ];

    // ========================================================================
    // Shop Items
    // ========================================================================

    let shop_items = vec![
        shop_item("cap", "Cool Cap", ItemCategory::Hats, 500, Currency::Coins, "🧢"),
        shop_item("crown", "Gold Crown", ItemCategory::Hats, 50, Currency::Gems, "👑"),
        shop_item("wizard", "Wizard Hat", ItemCategory::Hats, 1000, Currency::Coins, "🧙"),
        shop_item("party", "Party Hat", ItemCategory::Hats, 25, Currency::Gems, "🎉"),
        shop_item("hero", "Hero Suit", ItemCategory::Outfits, 2000, Currency::Coins, "🦸"),
        shop_item("space", "Space Suit", ItemCategory::Outfits, 75, Currency::Gems, "👨‍🚀"),
        shop_item("pirate", "Pirate", ItemCategory::Outfits, 1500, Currency::Coins, "🏴‍☠️"),
        shop_item("wink", "Wink", ItemCategory::Faces, 300, Currency::Coins, "😉"),
        shop_item("star", "Star Eyes", ItemCategory::Faces, 20, Currency::Gems, "🤩"),
        shop_item("kawaii", "Kawaii", ItemCategory::Faces, 500, Currency::Coins, "😊"),
        shop_item("sparkle", "Sparkle", ItemCategory::Effects, 30, Currency::Gems, "✨"),
        shop_item("fire", "Fire Aura", ItemCategory::Effects, 50, Currency::Gems, "🔥"),
        shop_item("rainbow", "Rainbow Trail", ItemCategory::Effects, 40, Currency::Gems, "🌈"),
    ];

    // ========================================================================
    // Daily Rewards (7-day cycle, day = min(streak, 7))
    // ========================================================================

    let daily_rewards = vec![
        DailyReward { day: 1, coins: 100, gems: 0, energy: 0 },
        DailyReward { day: 2, coins: 150, gems: 0, energy: 0 },
        DailyReward { day: 3, coins: 200, gems: 0, energy: 1 },
        DailyReward { day: 4, coins: 250, gems: 0, energy: 0 },
        DailyReward { day: 5, coins: 300, gems: 5, energy: 0 },
        DailyReward { day: 6, coins: 400, gems: 0, energy: 2 },
        DailyReward { day: 7, coins: 500, gems: 20, energy: 5 },
    ];

    // ========================================================================
    // Avatar Options
    // ========================================================================

    let avatar_options = AvatarOptions {
        skin_tones: vec![
            "#ffd6a5".into(),
            "#c68642".into(),
            "#8d5524".into(),
            "#3d2817".into(),
            "#f4c2a5".into(),
            "#d4a574".into(),
        ],
        faces: vec![
            choice("happy", "Happy", true),
            choice("cool", "Cool", true),
            choice("excited", "Excited", true),
            choice("wink", "Wink", false),
            choice("star", "Star Eyes", false),
            choice("kawaii", "Kawaii", false),
        ],
        hair_styles: vec![
            choice("short", "Short", true),
            choice("long", "Long", true),
            choice("curly", "Curly", true),
            choice("spiky", "Spiky", false),
            choice("bun", "Bun", false),
            choice("afro", "Afro", false),
        ],
        hair_colors: vec![
            "#2d1b00".into(),
            "#6b4423".into(),
            "#c93305".into(),
            "#e9c46a".into(),
            "#f4a261".into(),
            "#a855f7".into(),
            "#14b8a6".into(),
            "#3b82f6".into(),
        ],
        outfits: vec![
            choice("casual", "Casual", true),
            choice("sporty", "Sporty", true),
            choice("formal", "Formal", false),
            choice("hoodie", "Hoodie", false),
            choice("ninja", "Ninja", false),
            choice("robot", "Robot", false),
        ],
    };

    Catalog {
        achievements,
        shop_items,
        daily_rewards,
        avatar_options,
    }
}

/// The avatar every fresh profile starts with
pub fn default_avatar() -> AvatarCustomization {
    AvatarCustomization {
        skin_tone: "#ffd6a5".into(),
        face: "happy".into(),
        hair_style: "short".into(),
        hair_color: "#2d1b00".into(),
        outfit: "casual".into(),
        hat: None,
        effect: None,
    }
}

/// Build the default profile used when no persisted record exists
pub fn default_profile(now: DateTime<Utc>) -> Profile {
    Profile {
        id: format!("player_{}", Uuid::new_v4().simple()),
        username: "Player".into(),
        avatar: default_avatar(),
        level: 1,
        xp: 0,
        coins: STARTING_COINS,
        gems: STARTING_GEMS,
        energy: MAX_ENERGY,
        max_energy: MAX_ENERGY,
        last_energy_update: now,
        inventory: Inventory {
            hats: vec![],
            outfits: vec!["casual".into(), "sporty".into()],
            faces: vec!["happy".into(), "cool".into(), "excited".into()],
            effects: vec![],
        },
        achievements: vec![],
        game_stats: GameStatsTable::default(),
        daily_streak: 0,
        last_login_date: None,
        created_at: now,
    }
}

impl Catalog {
    pub fn achievement(&self, id: &str) -> Option<&AchievementDef> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn shop_item(&self, id: &str) -> Option<&ShopItem> {
        self.shop_items.iter().find(|i| i.id == id)
    }

    /// Reward row for a streak day; streaks past 7 days keep claiming day 7
    pub fn daily_reward_for_streak(&self, streak: u32) -> &DailyReward {
        let day = streak.clamp(1, self.daily_rewards.len() as u32);
        &self.daily_rewards[(day - 1) as usize]
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (idx, def) in self.achievements.iter().enumerate() {
            if def.id.is_empty() {
                errors.push(format!("Achievement #{} has empty ID", idx));
            }
            if def.name.is_empty() {
                errors.push(format!("Achievement '{}' has empty name", def.id));
            }
            if def.requirement == 0 {
                errors.push(format!("Achievement '{}' has zero requirement", def.id));
            }
            let reward = &def.reward;
            if reward.coins == 0 && reward.gems == 0 && reward.xp == 0 {
                errors.push(format!("Achievement '{}' has an empty reward", def.id));
            }
            if self.achievements.iter().filter(|a| a.id == def.id).count() > 1 {
                errors.push(format!("Duplicate achievement ID '{}'", def.id));
            }
        }

        for item in &self.shop_items {
            if item.id.is_empty() {
                errors.push("Shop item has empty ID".to_string());
            }
            if item.price == 0 {
                errors.push(format!("Shop item '{}' has zero price", item.id));
            }
            if self.shop_items.iter().filter(|i| i.id == item.id).count() > 1 {
                errors.push(format!("Duplicate shop item ID '{}'", item.id));
            }
        }

        if self.daily_rewards.len() != 7 {
            errors.push(format!(
                "Daily reward table has {} days, expected 7",
                self.daily_rewards.len()
            ));
        }
        for (idx, reward) in self.daily_rewards.iter().enumerate() {
            if reward.day != idx as u32 + 1 {
                errors.push(format!(
                    "Daily reward at index {} has day {}, expected {}",
                    idx,
                    reward.day,
                    idx + 1
                ));
            }
        }

        // Default profile items must exist in the avatar option lists
        let default = default_profile(Utc::now());
        for outfit in &default.inventory.outfits {
            if !self.avatar_options.outfits.iter().any(|o| &o.id == outfit) {
                errors.push(format!("Default outfit '{}' not in avatar options", outfit));
            }
        }
        for face in &default.inventory.faces {
            if !self.avatar_options.faces.iter().any(|f| &f.id == face) {
                errors.push(format!("Default face '{}' not in avatar options", face));
            }
        }
        if default.inventory.total_items() != DEFAULT_ITEM_COUNT {
            errors.push(format!(
                "Default inventory has {} items, DEFAULT_ITEM_COUNT is {}",
                default.inventory.total_items(),
                DEFAULT_ITEM_COUNT
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.achievements.len(), 8);
        assert_eq!(catalog.shop_items.len(), 13);
        assert_eq!(catalog.daily_rewards.len(), 7);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_game_has_a_high_score_achievement() {
        let catalog = build_default_catalog();
        for game in GameId::ALL {
            assert!(
                catalog
                    .achievements
                    .iter()
                    .any(|a| a.kind == AchievementKind::HighScore(game)),
                "No high-score achievement for {}",
                game
            );
        }
    }

    #[test]
    fn test_daily_reward_clamps_to_week() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.daily_reward_for_streak(1).day, 1);
        assert_eq!(catalog.daily_reward_for_streak(7).day, 7);
        assert_eq!(catalog.daily_reward_for_streak(30).day, 7);
        // Streak 0 never happens after login reconciliation, but stays in range
        assert_eq!(catalog.daily_reward_for_streak(0).day, 1);
    }

    #[test]
    fn test_default_profile_starting_state() {
        let now = Utc::now();
        let profile = default_profile(now);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.coins, STARTING_COINS);
        assert_eq!(profile.gems, STARTING_GEMS);
        assert_eq!(profile.energy, MAX_ENERGY);
        assert_eq!(profile.inventory.total_items(), DEFAULT_ITEM_COUNT);
        assert!(profile.achievements.is_empty());
        assert_eq!(profile.items_purchased(), 0);
    }

    #[test]
    fn test_shop_lookup() {
        let catalog = build_default_catalog();
        let crown = catalog.shop_item("crown").unwrap();
        assert_eq!(crown.price, 50);
        assert_eq!(crown.currency, Currency::Gems);
        assert!(catalog.shop_item("nonexistent").is_none());
    }
}
