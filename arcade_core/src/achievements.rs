//! Achievement evaluation: unlock pass and derived progress.
//!
//! Both entry points read the same [`AchievementKind::metric`] per
//! definition, so the progress a screen renders and the predicate that
//! unlocks the achievement cannot disagree.

use crate::catalog::Catalog;
use crate::progression::apply_xp;
use crate::types::{AchievementDef, AchievementProgress, Profile};

/// Unlock every achievement whose requirement the profile now meets and
/// credit its reward, in one pass.
///
/// Predicates are all evaluated against the profile as it stands on entry;
/// rewards credited during the pass do not re-trigger evaluation. An
/// achievement whose requirement is only met by another achievement's
/// reward unlocks on the next mutating call.
///
/// Returns the definitions that newly unlocked, in catalog order.
pub fn evaluate_unlocks(
    profile: &mut Profile,
    catalog: &Catalog,
    xp_per_level: u32,
) -> Vec<AchievementDef> {
    let newly: Vec<AchievementDef> = catalog
        .achievements
        .iter()
        .filter(|def| !profile.has_achievement(&def.id))
        .filter(|def| def.kind.metric(profile) >= def.requirement)
        .cloned()
        .collect();

    for def in &newly {
        profile.achievements.push(def.id.clone());
        profile.coins += def.reward.coins;
        profile.gems += def.reward.gems;
        if def.reward.xp > 0 {
            apply_xp(profile, def.reward.xp, xp_per_level);
        }

        tracing::info!(
            "Achievement unlocked: {} (+{} coins, +{} gems, +{} xp)",
            def.id,
            def.reward.coins,
            def.reward.gems,
            def.reward.xp
        );
    }

    newly
}

/// Annotate every catalog achievement with the profile's current progress.
///
/// Derived on demand; never persisted.
pub fn achievement_progress(profile: &Profile, catalog: &Catalog) -> Vec<AchievementProgress> {
    catalog
        .achievements
        .iter()
        .map(|def| AchievementProgress {
            progress: def.kind.metric(profile),
            unlocked: profile.has_achievement(&def.id),
            definition: def.clone(),
        })
        .collect()
}
