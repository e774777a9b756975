//! Client-side mock leaderboard.
//!
//! There is no server; the board is ten rows where the player's row carries
//! their real score and the other nine are bots with deterministic
//! pseudo-scores (seeded by name, never by the wall clock, so the board is
//! stable within a day's play and testable).

use crate::types::{GameId, LeaderboardEntry, Profile};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const BOARD_SIZE: usize = 10;

/// Score shown for the player on a board: the per-game high score, or
/// `level * 100` on the global board
fn player_score(profile: &Profile, game: Option<GameId>) -> u32 {
    match game {
        Some(game) => profile.game_stats.get(game).high_score,
        None => profile.level * 100,
    }
}

fn bot_score(name: &str, game: Option<GameId>) -> u32 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    game.map(|g| g.as_str()).unwrap_or("all").hash(&mut hasher);
    (hasher.finish() % 1000) as u32
}

/// Build the ten-row board for a game (or the global board), sorted by
/// score descending and ranked from 1
pub fn build_leaderboard(profile: &Profile, game: Option<GameId>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(BOARD_SIZE);

    entries.push(LeaderboardEntry {
        id: profile.id.clone(),
        username: profile.username.clone(),
        avatar: profile.avatar.clone(),
        score: player_score(profile, game),
        rank: 0,
    });

    for i in 1..BOARD_SIZE {
        let username = format!("Player {}", i + 1);
        entries.push(LeaderboardEntry {
            id: format!("bot_{}", i),
            score: bot_score(&username, game),
            username,
            avatar: profile.avatar.clone(),
            rank: 0,
        });
    }

    entries.sort_by(|a, b| b.score.cmp(&a.score));
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }

    entries
}
