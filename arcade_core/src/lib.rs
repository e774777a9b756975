#![forbid(unsafe_code)]

//! Core domain model and business logic for the Pocket Arcade shell.
//!
//! This crate provides:
//! - Domain types (profile, avatar, inventory, game stats, achievements)
//! - The progression engine (currency, XP/level, energy, daily streak)
//! - Static content catalog (achievements, shop, daily rewards)
//! - Persistence (key-value store, session journal, CSV archive)
//! - Mock local auth and the client-side leaderboard

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod progression;
pub mod achievements;
pub mod engine;
pub mod journal;
pub mod rollup;
pub mod history;
pub mod leaderboard;
pub mod auth;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use store::{FileStore, KvStore};
pub use engine::Engine;
pub use journal::{JsonlSink, SessionSink};
pub use history::load_recent_sessions;
pub use achievements::achievement_progress;
pub use leaderboard::build_leaderboard;
pub use auth::AuthService;
