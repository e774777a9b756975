use arcade_core::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "arcade")]
#[command(about = "Pocket Arcade - casual minigame shell", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the player profile (default)
    Status,

    /// Report a finished game: spends 1 energy, records the score and
    /// credits the earned coins and XP
    Play {
        /// Which game was played (obby_rush, memory_match, dodge_master)
        game: String,

        /// Final score
        #[arg(long)]
        score: u32,

        /// Coins earned; defaults to the game's own score formula
        #[arg(long)]
        coins: Option<u32>,

        /// XP earned; defaults to the game's own score formula
        #[arg(long)]
        xp: Option<u32>,
    },

    /// Claim today's login reward
    Daily,

    /// Browse or buy from the item shop
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },

    /// List achievements with current progress
    Achievements,

    /// Show the leaderboard for a game, or the global board
    Leaderboard {
        /// obby_rush, memory_match or dodge_master; omit for the global board
        game: Option<String>,
    },

    /// List recently played games
    History {
        /// How many days back to look
        #[arg(long, default_value_t = 7)]
        days: i64,
    },

    /// Show or change the avatar
    Avatar {
        #[command(subcommand)]
        action: AvatarAction,
    },

    /// Mock account management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Roll up journaled game sessions to CSV
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ShopAction {
    /// List all shop items
    List,
    /// Buy an item by id
    Buy { item: String },
}

#[derive(Subcommand)]
enum AvatarAction {
    /// Print the current avatar
    Show,
    /// Change avatar fields; unset fields keep their current value
    Set {
        #[arg(long)]
        skin_tone: Option<String>,
        #[arg(long)]
        face: Option<String>,
        #[arg(long)]
        hair_style: Option<String>,
        #[arg(long)]
        hair_color: Option<String>,
        #[arg(long)]
        outfit: Option<String>,
        #[arg(long)]
        hat: Option<String>,
        #[arg(long)]
        effect: Option<String>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Register a new account
    Signup {
        username: String,
        email: String,
        password: String,
    },
    /// Confirm the pending sign-up with the emailed code
    Verify { code: String },
    /// Log in with username or email
    Login {
        email_or_username: String,
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Continue as a guest
    Guest,
    /// Print the signed-in user
    Whoami,
    /// Request a password-reset email
    ResetPassword { email: String },
    /// Sign out (the game profile stays)
    Logout,
}

fn main() -> Result<()> {
    // Initialize logging
    arcade_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Status) | None => cmd_status(data_dir, &config),
        Some(Commands::Play {
            game,
            score,
            coins,
            xp,
        }) => cmd_play(data_dir, &config, &game, score, coins, xp),
        Some(Commands::Daily) => cmd_daily(data_dir, &config),
        Some(Commands::Shop { action }) => cmd_shop(data_dir, &config, action),
        Some(Commands::Achievements) => cmd_achievements(data_dir, &config),
        Some(Commands::Leaderboard { game }) => cmd_leaderboard(data_dir, &config, game),
        Some(Commands::History { days }) => cmd_history(data_dir, days),
        Some(Commands::Avatar { action }) => cmd_avatar(data_dir, &config, action),
        Some(Commands::Auth { action }) => cmd_auth(data_dir, action),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, cleanup),
    }
}

fn open_engine(data_dir: &PathBuf, config: &Config) -> Result<Engine<FileStore>> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    let store = FileStore::open(data_dir.join("store"))?;
    Ok(Engine::load(store, config.clone()))
}

fn journal_path(data_dir: &PathBuf) -> PathBuf {
    data_dir.join("journal").join("game_sessions.jsonl")
}

fn csv_path(data_dir: &PathBuf) -> PathBuf {
    data_dir.join("sessions.csv")
}

/// The per-game reward formulas the minigame screens apply to a final score
fn default_rewards(game: GameId, score: u32) -> (u32, u32) {
    match game {
        GameId::ObbyRush => (score / 10, score / 5),
        GameId::MemoryMatch => (score / 20, score / 10),
        GameId::DodgeMaster => (score / 5, score / 3),
    }
}

fn cmd_status(data_dir: PathBuf, config: &Config) -> Result<()> {
    let engine = open_engine(&data_dir, config)?;
    let profile = engine.profile();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", profile.username);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Level {}  ({}/{} XP)",
        profile.level,
        profile.xp,
        config.rules.xp_per_level * profile.level
    );
    println!("  Coins: {}   Gems: {}", profile.coins, profile.gems);
    println!("  Energy: {}/{}", profile.energy, profile.max_energy);
    println!("  Daily streak: {} day(s)", profile.daily_streak);
    println!();

    for (game, stats) in profile.game_stats.iter() {
        println!(
            "  {:<14} high score {:>6}   played {:>3}   coins {:>6}",
            game.display_name(),
            stats.high_score,
            stats.games_played,
            stats.total_coins
        );
    }
    println!();

    Ok(())
}

fn cmd_play(
    data_dir: PathBuf,
    config: &Config,
    game: &str,
    score: u32,
    coins: Option<u32>,
    xp: Option<u32>,
) -> Result<()> {
    let game = GameId::from_str(game)?;
    let mut engine = open_engine(&data_dir, config)?;

    if !engine.spend_energy(1) {
        println!(
            "⚠ Out of energy! Energy refills every {} minutes.",
            config.rules.energy_refill_minutes
        );
        return Ok(());
    }

    let (default_coins, default_xp) = default_rewards(game, score);
    let coins = coins.unwrap_or(default_coins);
    let xp = xp.unwrap_or(default_xp);

    // The end-of-game pattern: record stats, then credit coins and XP
    let mut unlocked = engine.record_game_result(game, score, coins);
    unlocked.extend(engine.add_coins(coins));
    unlocked.extend(engine.add_xp(xp));

    // Journal the session for history and rollup
    let session = GameSession {
        id: uuid::Uuid::new_v4(),
        game,
        score,
        coins_earned: coins,
        xp_earned: xp,
        played_at: chrono::Utc::now(),
    };
    let mut sink = JsonlSink::new(journal_path(&data_dir));
    sink.append(&session)?;

    println!("\n✓ {} finished: score {}", game.display_name(), score);
    println!("  +{} coins, +{} XP", coins, xp);

    let profile = engine.profile();
    let stats = profile.game_stats.get(game);
    if score >= stats.high_score {
        println!("  ★ New high score!");
    }
    println!(
        "  Energy left: {}/{}",
        profile.energy, profile.max_energy
    );

    for def in &unlocked {
        println!(
            "\n🏆 Achievement unlocked: {} {} - {}",
            def.icon, def.name, def.description
        );
    }

    Ok(())
}

fn cmd_daily(data_dir: PathBuf, config: &Config) -> Result<()> {
    let mut engine = open_engine(&data_dir, config)?;
    let streak = engine.profile().daily_streak;
    let reward = *engine.catalog().daily_reward_for_streak(streak);

    engine.claim_daily_reward(reward.coins, reward.gems, reward.energy);

    println!("\n✓ Day {} reward claimed (streak: {})", reward.day, streak);
    if reward.coins > 0 {
        println!("  +{} coins", reward.coins);
    }
    if reward.gems > 0 {
        println!("  +{} gems", reward.gems);
    }
    if reward.energy > 0 {
        println!("  +{} energy", reward.energy);
    }

    Ok(())
}

fn cmd_shop(data_dir: PathBuf, config: &Config, action: ShopAction) -> Result<()> {
    let mut engine = open_engine(&data_dir, config)?;

    match action {
        ShopAction::List => {
            println!();
            for item in &engine.catalog().shop_items {
                let owned = engine
                    .profile()
                    .inventory
                    .owns(item.category, &item.id);
                println!(
                    "  {} {:<14} [{:<10}] {:>5} {:<5} {}",
                    item.preview,
                    item.name,
                    item.id,
                    item.price,
                    match item.currency {
                        Currency::Coins => "coins",
                        Currency::Gems => "gems",
                    },
                    if owned { "(owned)" } else { "" }
                );
            }
            println!();
        }

        ShopAction::Buy { item } => {
            let (category, price, currency, name) = {
                let item = engine
                    .catalog()
                    .shop_item(&item)
                    .ok_or_else(|| Error::Other(format!("unknown item: {}", item)))?;
                (item.category, item.price, item.currency, item.name.clone())
            };

            // Ownership is the caller's job; the engine allows duplicates
            if engine.profile().inventory.owns(category, &item) {
                println!("You already own {}.", name);
                return Ok(());
            }

            if engine.purchase_item(&item, category, price, currency) {
                println!("✓ Bought {}!", name);
                let profile = engine.profile();
                println!(
                    "  Balance: {} coins, {} gems",
                    profile.coins, profile.gems
                );
            } else {
                println!(
                    "⚠ Not enough {} for {} ({} needed).",
                    match currency {
                        Currency::Coins => "coins",
                        Currency::Gems => "gems",
                    },
                    name,
                    price
                );
            }
        }
    }

    Ok(())
}

fn cmd_achievements(data_dir: PathBuf, config: &Config) -> Result<()> {
    let engine = open_engine(&data_dir, config)?;

    println!();
    for entry in engine.achievement_progress() {
        let def = &entry.definition;
        let marker = if entry.unlocked { "✓" } else { " " };
        println!(
            "  [{}] {} {:<16} {:>5}/{:<5}  {}",
            marker,
            def.icon,
            def.name,
            entry.progress.min(def.requirement),
            def.requirement,
            def.description
        );
    }
    println!();

    Ok(())
}

fn cmd_leaderboard(data_dir: PathBuf, config: &Config, game: Option<String>) -> Result<()> {
    let engine = open_engine(&data_dir, config)?;
    let game = match game {
        Some(g) => Some(GameId::from_str(&g)?),
        None => None,
    };

    let title = game
        .map(|g| g.display_name())
        .unwrap_or("Global");
    println!("\n  {} leaderboard", title);
    println!("  ─────────────────────────────");

    let player_id = engine.profile().id.clone();
    for entry in build_leaderboard(engine.profile(), game) {
        let medal = match entry.rank {
            1 => "🥇",
            2 => "🥈",
            3 => "🥉",
            _ => "  ",
        };
        let you = if entry.id == player_id { "  ◀ you" } else { "" };
        println!(
            "  {:>2}. {} {:<12} {:>6}{}",
            entry.rank, medal, entry.username, entry.score, you
        );
    }
    println!();

    Ok(())
}

fn cmd_history(data_dir: PathBuf, days: i64) -> Result<()> {
    let sessions = load_recent_sessions(&journal_path(&data_dir), &csv_path(&data_dir), days)?;

    if sessions.is_empty() {
        println!("No games played in the last {} days.", days);
        return Ok(());
    }

    println!("\n  Last {} days ({} games)", days, sessions.len());
    println!("  ─────────────────────────────");
    for session in &sessions {
        println!(
            "  {}  {:<14} score {:>6}  +{} coins  +{} XP",
            session.played_at.format("%Y-%m-%d %H:%M"),
            session.game.display_name(),
            session.score,
            session.coins_earned,
            session.xp_earned
        );
    }

    println!();
    for game in GameId::ALL {
        if let Some(best) = arcade_core::history::personal_best(&sessions, game) {
            println!("  {:<14} best {:>6}", game.display_name(), best);
        }
    }
    println!();

    Ok(())
}

fn cmd_avatar(data_dir: PathBuf, config: &Config, action: AvatarAction) -> Result<()> {
    let mut engine = open_engine(&data_dir, config)?;

    match action {
        AvatarAction::Show => {
            let avatar = &engine.profile().avatar;
            println!();
            println!("  Skin tone:  {}", avatar.skin_tone);
            println!("  Face:       {}", avatar.face);
            println!("  Hair:       {} ({})", avatar.hair_style, avatar.hair_color);
            println!("  Outfit:     {}", avatar.outfit);
            println!("  Hat:        {}", avatar.hat.as_deref().unwrap_or("-"));
            println!("  Effect:     {}", avatar.effect.as_deref().unwrap_or("-"));
            println!();
        }

        AvatarAction::Set {
            skin_tone,
            face,
            hair_style,
            hair_color,
            outfit,
            hat,
            effect,
        } => {
            let mut avatar = engine.profile().avatar.clone();
            if let Some(v) = skin_tone {
                avatar.skin_tone = v;
            }
            if let Some(v) = face {
                avatar.face = v;
            }
            if let Some(v) = hair_style {
                avatar.hair_style = v;
            }
            if let Some(v) = hair_color {
                avatar.hair_color = v;
            }
            if let Some(v) = outfit {
                avatar.outfit = v;
            }
            if let Some(v) = hat {
                avatar.hat = Some(v);
            }
            if let Some(v) = effect {
                avatar.effect = Some(v);
            }

            engine.update_avatar(avatar);
            if !engine.has_seen_onboarding() {
                engine.complete_onboarding();
            }
            println!("✓ Avatar updated");
        }
    }

    Ok(())
}

fn cmd_auth(data_dir: PathBuf, action: AuthAction) -> Result<()> {
    let auth = AuthService::new(FileStore::open(data_dir.join("store"))?);

    // Auth failures are alerts, not process errors
    let outcome: Result<String> = match action {
        AuthAction::Signup {
            username,
            email,
            password,
        } => auth.sign_up(&username, &email, &password).map(|pending| {
            format!(
                "Account created. Verification code sent to {} (any 6 digits work).",
                pending.email
            )
        }),

        AuthAction::Verify { code } => auth
            .verify_email(&code)
            .map(|user| format!("Email verified. Welcome, {}!", user.username)),

        AuthAction::Login {
            email_or_username,
            password,
            remember,
        } => auth
            .login(&email_or_username, &password, remember)
            .map(|user| format!("Logged in as {}.", user.username)),

        AuthAction::Guest => auth
            .login_as_guest()
            .map(|user| format!("Playing as {}.", user.username)),

        AuthAction::Whoami => Ok(match auth.current_user() {
            Some(user) if user.is_guest => format!("{} (guest)", user.username),
            Some(user) => format!("{} <{}>", user.username, user.email),
            None => "Not signed in.".to_string(),
        }),

        AuthAction::ResetPassword { email } => auth
            .request_password_reset(&email)
            .map(|_| format!("Password reset email sent to {}.", email)),

        AuthAction::Logout => auth.logout().map(|_| "Logged out.".to_string()),
    };

    match outcome {
        Ok(message) => println!("{}", message),
        Err(Error::Auth(message)) => println!("✗ {}", message),
        Err(e) => return Err(e),
    }

    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let journal_path = journal_path(&data_dir);
    let csv_path = csv_path(&data_dir);

    if !journal_path.exists() {
        println!("No journal file found - nothing to roll up.");
        return Ok(());
    }

    let count = arcade_core::rollup::journal_to_csv_and_archive(&journal_path, &csv_path)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let journal_dir = journal_path
            .parent()
            .ok_or_else(|| Error::Other("journal path missing parent".into()))?;
        let cleaned = arcade_core::rollup::cleanup_processed_journals(journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
