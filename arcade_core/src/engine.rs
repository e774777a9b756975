//! The progression engine: single owner of the player profile.
//!
//! Every mutation goes through a `&mut self` method here, so each transition
//! reads the latest committed profile rather than a stale snapshot, and two
//! back-to-back UI events can never clobber each other's writes.
//!
//! Persistence is best-effort: a failed store write is logged and the
//! in-memory state stands. Insufficient-resource failures (energy, currency)
//! come back as a plain `false` for the caller to surface.

use crate::achievements::{achievement_progress, evaluate_unlocks};
use crate::catalog::{self, Catalog};
use crate::config::Config;
use crate::progression;
use crate::store::{keys, KvStore};
use crate::types::{
    AchievementDef, AchievementProgress, AvatarCustomization, Currency, GameId, ItemCategory,
    Profile,
};
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Owns the profile, the store handle and the tuning parameters
pub struct Engine<S: KvStore> {
    store: S,
    config: Config,
    catalog: &'static Catalog,
    profile: Profile,
    has_seen_onboarding: bool,
}

impl<S: KvStore> Engine<S> {
    /// Load persisted state and reconcile it against the current clock.
    ///
    /// A missing or unreadable profile falls back to the defaults; a profile
    /// that fails to parse is logged as data loss (distinct from "no data")
    /// and also falls back. Never fails.
    pub fn load(store: S, config: Config) -> Self {
        Self::load_at(store, config, Utc::now(), Local::now().date_naive())
    }

    /// Load with an explicit clock; the seam tests use to pin reconciliation
    pub fn load_at(store: S, config: Config, now: DateTime<Utc>, today: NaiveDate) -> Self {
        let profile = match store.get(keys::PROFILE) {
            Ok(Some(raw)) => match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(
                        "Stored profile is corrupt, prior progress lost: {}. Starting fresh.",
                        e
                    );
                    catalog::default_profile(now)
                }
            },
            Ok(None) => {
                tracing::info!("No stored profile, creating default");
                catalog::default_profile(now)
            }
            Err(e) => {
                tracing::warn!("Unable to read stored profile: {}. Starting fresh.", e);
                catalog::default_profile(now)
            }
        };

        let has_seen_onboarding = match store.get(keys::HAS_SEEN_AVATAR_CREATOR) {
            Ok(flag) => flag.is_some(),
            Err(e) => {
                tracing::warn!("Unable to read onboarding flag: {}", e);
                false
            }
        };

        let mut engine = Self {
            store,
            config,
            catalog: catalog::get_default_catalog(),
            profile,
            has_seen_onboarding,
        };

        // Reconcile before the profile is first exposed to callers
        let energy_changed =
            progression::reconcile_energy(&mut engine.profile, now, engine.refill_minutes());
        let login_changed = progression::reconcile_daily_login(&mut engine.profile, today);
        if energy_changed || login_changed {
            engine.save_profile();
        }

        engine
    }

    fn refill_minutes(&self) -> u32 {
        self.config.rules.energy_refill_minutes
    }

    fn xp_per_level(&self) -> u32 {
        self.config.rules.xp_per_level
    }

    /// Persist the current profile; failure is logged, never propagated
    fn save_profile(&self) {
        let raw = match serde_json::to_string(&self.profile) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize profile: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(keys::PROFILE, &raw) {
            tracing::warn!("Failed to save profile, continuing in memory: {}", e);
        }
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn has_seen_onboarding(&self) -> bool {
        self.has_seen_onboarding
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Achievements annotated with current progress, derived on demand
    pub fn achievement_progress(&self) -> Vec<AchievementProgress> {
        achievement_progress(&self.profile, self.catalog)
    }

    // ========================================================================
    // Mutation surface
    // ========================================================================

    /// Re-run energy regeneration against the current clock.
    ///
    /// The GUI shell drives this from a 60-second timer; a CLI process runs
    /// it at load and before energy-gated operations.
    pub fn reconcile_now(&mut self) {
        self.reconcile_at(Utc::now());
    }

    pub fn reconcile_at(&mut self, now: DateTime<Utc>) {
        if progression::reconcile_energy(&mut self.profile, now, self.refill_minutes()) {
            self.save_profile();
        }
    }

    /// Replace the avatar wholesale. The avatar screen only offers owned
    /// options, so no validation happens here.
    pub fn update_avatar(&mut self, avatar: AvatarCustomization) {
        self.profile.avatar = avatar;
        self.save_profile();
    }

    /// Mark the avatar-creator onboarding as seen, persisted independently
    /// of the profile blob
    pub fn complete_onboarding(&mut self) {
        self.has_seen_onboarding = true;
        if let Err(e) = self.store.set(keys::HAS_SEEN_AVATAR_CREATOR, "true") {
            tracing::warn!("Failed to save onboarding flag: {}", e);
        }
    }

    /// Spend energy; false means insufficient energy and no mutation
    pub fn spend_energy(&mut self, amount: u32) -> bool {
        if !progression::spend_energy(&mut self.profile, amount) {
            return false;
        }
        self.save_profile();
        true
    }

    /// Credit coins and re-evaluate achievements
    pub fn add_coins(&mut self, amount: u32) -> Vec<AchievementDef> {
        self.profile.coins += amount;
        let unlocked = evaluate_unlocks(&mut self.profile, self.catalog, self.xp_per_level());
        self.save_profile();
        unlocked
    }

    /// Credit gems. Gems feed no achievement aggregate, so no re-evaluation.
    pub fn add_gems(&mut self, amount: u32) {
        self.profile.gems += amount;
        self.save_profile();
    }

    /// Credit XP, normalize the level, and re-evaluate achievements
    pub fn add_xp(&mut self, amount: u32) -> Vec<AchievementDef> {
        progression::apply_xp(&mut self.profile, amount, self.xp_per_level());
        let unlocked = evaluate_unlocks(&mut self.profile, self.catalog, self.xp_per_level());
        self.save_profile();
        unlocked
    }

    /// Fold a finished game into its aggregates and re-evaluate
    /// achievements. Does not credit coins or XP; callers follow up with
    /// `add_coins` / `add_xp`.
    pub fn record_game_result(
        &mut self,
        game: GameId,
        score: u32,
        coins_earned: u32,
    ) -> Vec<AchievementDef> {
        progression::record_game_result(&mut self.profile, game, score, coins_earned);
        let unlocked = evaluate_unlocks(&mut self.profile, self.catalog, self.xp_per_level());
        self.save_profile();
        unlocked
    }

    /// Purchase an item; false means the balance did not cover the price
    /// and nothing changed. Duplicate-ownership checks are the caller's job.
    pub fn purchase_item(
        &mut self,
        item_id: &str,
        category: ItemCategory,
        price: u32,
        currency: Currency,
    ) -> bool {
        if !progression::purchase(&mut self.profile, item_id, category, price, currency) {
            return false;
        }
        evaluate_unlocks(&mut self.profile, self.catalog, self.xp_per_level());
        self.save_profile();
        true
    }

    /// Credit the daily reward. Streak advancement happened at load time;
    /// claiming is decoupled from it and unconditional.
    pub fn claim_daily_reward(&mut self, coins: u32, gems: u32, energy: u32) {
        progression::claim_daily_reward(&mut self.profile, coins, gems, energy);
        self.save_profile();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use chrono::Duration;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir) -> Engine<FileStore> {
        let store = FileStore::open(dir.path()).unwrap();
        Engine::load(store, Config::default())
    }

    #[test]
    fn test_load_creates_default_profile() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);

        assert_eq!(engine.profile().level, 1);
        assert_eq!(engine.profile().coins, 1000);
        // First load counts as the first daily login
        assert_eq!(engine.profile().daily_streak, 1);
        assert!(!engine.has_seen_onboarding());
    }

    #[test]
    fn test_profile_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut engine = engine_in(&dir);
            engine.add_gems(25);
            engine.update_avatar(AvatarCustomization {
                outfit: "sporty".into(),
                ..catalog::default_avatar()
            });
        }

        let engine = engine_in(&dir);
        assert_eq!(engine.profile().gems, 75);
        assert_eq!(engine.profile().avatar.outfit, "sporty");
    }

    #[test]
    fn test_corrupt_profile_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set(keys::PROFILE, "{ not json }").unwrap();

        let engine = Engine::load(store, Config::default());
        assert_eq!(engine.profile().level, 1);
        assert_eq!(engine.profile().coins, 1000);
    }

    #[test]
    fn test_load_reconciles_energy() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let today = now.date_naive();

        {
            let mut engine = engine_in(&dir);
            assert!(engine.spend_energy(4));
            assert_eq!(engine.profile().energy, 1);
        }

        // Reload 25 minutes later: two whole 10-minute units regenerate
        let store = FileStore::open(dir.path()).unwrap();
        let engine = Engine::load_at(
            store,
            Config::default(),
            now + Duration::minutes(25),
            today,
        );
        assert_eq!(engine.profile().energy, 3);
    }

    #[test]
    fn test_load_advances_streak_across_days() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let today = now.date_naive();

        {
            let store = FileStore::open(dir.path()).unwrap();
            let engine = Engine::load_at(store, Config::default(), now, today);
            assert_eq!(engine.profile().daily_streak, 1);
        }

        // Next calendar day extends the streak
        let store = FileStore::open(dir.path()).unwrap();
        let engine = Engine::load_at(
            store,
            Config::default(),
            now + Duration::days(1),
            today.succ_opt().unwrap(),
        );
        assert_eq!(engine.profile().daily_streak, 2);

        // A two-day gap resets it
        let store = FileStore::open(dir.path()).unwrap();
        let engine = Engine::load_at(
            store,
            Config::default(),
            now + Duration::days(4),
            today + Duration::days(4),
        );
        assert_eq!(engine.profile().daily_streak, 1);
    }

    #[test]
    fn test_onboarding_flag_is_independent_of_profile() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut engine = engine_in(&dir);
            engine.complete_onboarding();
        }

        let engine = engine_in(&dir);
        assert!(engine.has_seen_onboarding());
    }

    #[test]
    fn test_spend_energy_rejection_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);

        assert!(!engine.spend_energy(99));
        assert_eq!(engine.profile().energy, 5);
    }

    #[test]
    fn test_purchase_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);

        assert!(engine.purchase_item("cap", ItemCategory::Hats, 500, Currency::Coins));
        assert_eq!(engine.profile().coins, 500);
        assert!(engine.profile().inventory.owns(ItemCategory::Hats, "cap"));

        // Second expensive purchase is rejected outright
        assert!(!engine.purchase_item("wizard", ItemCategory::Hats, 1000, Currency::Coins));
        assert_eq!(engine.profile().coins, 500);
        assert_eq!(engine.profile().inventory.hats.len(), 1);
    }

    #[test]
    fn test_game_end_flow_unlocks_and_credits() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);

        // The observed end-of-game pattern: record stats, then credit coins
        // and XP separately.
        let unlocked = engine.record_game_result(GameId::ObbyRush, 1000, 100);
        engine.add_coins(100);
        engine.add_xp(50);

        let ids: Vec<_> = unlocked.iter().map(|d| d.id.as_str()).collect();
        assert!(ids.contains(&"first_game"));
        assert!(ids.contains(&"obby_master"));

        let profile = engine.profile();
        let stats = profile.game_stats.get(GameId::ObbyRush);
        assert_eq!(stats.high_score, 1000);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_coins, 100);

        // 1000 start + 100 first_game reward + 100 earned
        assert_eq!(profile.coins, 1200);
        // 50 start + 15 obby_master reward
        assert_eq!(profile.gems, 65);
        // first_game 50 xp + obby_master 150 xp + 50 earned = 250 total:
        // level 1 clears at 100, level 2 at 200 more
        assert_eq!(profile.level, 2);
        assert_eq!(profile.xp, 150);
    }

    #[test]
    fn test_achievement_reward_credited_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);

        engine.record_game_result(GameId::DodgeMaster, 70, 5);
        let gems = engine.profile().gems;

        // Replaying below the high score re-evaluates but must not re-credit
        engine.record_game_result(GameId::DodgeMaster, 30, 5);
        assert_eq!(engine.profile().gems, gems);
        assert_eq!(
            engine
                .profile()
                .achievements
                .iter()
                .filter(|a| *a == "dodge_expert")
                .count(),
            1
        );
    }

    #[test]
    fn test_profile_serde_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);

        engine.record_game_result(GameId::MemoryMatch, 640, 32);
        engine.add_xp(230);
        engine.purchase_item("star", ItemCategory::Faces, 20, Currency::Gems);

        let original = engine.profile().clone();
        let raw = serde_json::to_string(&original).unwrap();
        let restored: Profile = serde_json::from_str(&raw).unwrap();
        assert_eq!(original, restored);
    }
}
