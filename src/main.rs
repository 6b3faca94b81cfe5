use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use snake_neo::game::{Achievement, BoardSize, Difficulty};
use snake_neo::modes::HumanMode;
use snake_neo::progress::{
    JsonFileStore, LEADERBOARD_LIMIT, ProgressStore, PurchaseOutcome, Skin,
};
use snake_neo::session::Session;

#[derive(Parser)]
#[command(name = "snake-neo")]
#[command(version, about = "Snake with golden fruit, power-ups and achievements")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Where progress and settings are stored
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log file (defaults to snake-neo.log in the data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play in the terminal (default)
    Play(PlayArgs),
    /// Show the local leaderboard
    Scores {
        #[arg(long, default_value_t = LEADERBOARD_LIMIT)]
        limit: usize,
    },
    /// List achievements and which are unlocked
    Achievements,
    /// Spend coins on snake skins
    Shop {
        #[command(subcommand)]
        action: Option<ShopAction>,
    },
    /// Forget best score, coins, achievements, leaderboard and skins
    ResetProgress {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Default)]
struct PlayArgs {
    /// easy, normal or hard (saved for next time)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// small, medium or large (saved for next time)
    #[arg(long, value_parser = parse_board)]
    board: Option<BoardSize>,

    /// Wrap around the board edges (saved for next time)
    #[arg(long, conflicts_with = "no_wrap")]
    wrap: bool,

    /// Walls end the run (saved for next time)
    #[arg(long)]
    no_wrap: bool,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Submit each finished run to the leaderboard under this name
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum ShopAction {
    /// List skins and prices
    List,
    /// Buy a skin (or equip it if already owned)
    Buy {
        #[arg(value_parser = parse_skin)]
        skin: Skin,
    },
    /// Equip an owned skin
    Equip {
        #[arg(value_parser = parse_skin)]
        skin: Skin,
    },
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::parse(value).ok_or_else(|| format!("unknown difficulty '{value}'"))
}

fn parse_board(value: &str) -> Result<BoardSize, String> {
    BoardSize::parse(value).ok_or_else(|| format!("unknown board size '{value}'"))
}

fn parse_skin(value: &str) -> Result<Skin, String> {
    Skin::parse(value).ok_or_else(|| format!("unknown skin '{value}'"))
}

fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("snake-neo");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return PathBuf::from(home).join(".local/share/snake-neo");
    }
    PathBuf::from(".snake-neo")
}

/// The terminal belongs to the game, so logs go to a file
fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let log_file = cli
        .log_file
        .unwrap_or_else(|| data_dir.join("snake-neo.log"));
    init_tracing(&log_file)?;

    let mut store = JsonFileStore::new(&data_dir);

    // Dispatch to appropriate command
    match cli.command.unwrap_or(Commands::Play(PlayArgs::default())) {
        Commands::Play(args) => play(store, args).await?,
        Commands::Scores { limit } => show_scores(&store, limit),
        Commands::Achievements => show_achievements(&store),
        Commands::Shop { action } => shop(&mut store, action.unwrap_or(ShopAction::List))?,
        Commands::ResetProgress { yes } => reset_progress(&mut store, yes)?,
    }

    Ok(())
}

async fn play(mut store: JsonFileStore, args: PlayArgs) -> Result<()> {
    let mut settings = store.settings_or_default();
    let mut changed = false;

    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
        changed = true;
    }
    if let Some(board) = args.board {
        settings.board_size = board;
        changed = true;
    }
    if args.wrap || args.no_wrap {
        settings.wrap = args.wrap;
        changed = true;
    }
    if changed {
        store
            .save_settings(&settings)
            .context("Failed to save settings")?;
    }

    info!(
        difficulty = %settings.difficulty,
        board = ?settings.board_size,
        wrap = settings.wrap,
        data_dir = %store.dir().display(),
        "starting game"
    );

    let mut session = Session::with_settings(store, settings, args.seed)?;
    session.set_player_name(args.name);

    let mut human_mode = HumanMode::new(session);
    human_mode.run().await
}

fn show_scores(store: &JsonFileStore, limit: usize) {
    let progress = store.progress_or_default();
    println!("Best score: {}", progress.best_score);

    let top = progress.top_scores(limit);
    if top.is_empty() {
        println!("No scores submitted yet. Play with --name to record yours.");
        return;
    }
    for (rank, entry) in top.iter().enumerate() {
        println!("#{:<3} {:<16} {:>5}", rank + 1, entry.name, entry.score);
    }
}

fn show_achievements(store: &JsonFileStore) {
    let progress = store.progress_or_default();
    for achievement in Achievement::ALL {
        let mark = if progress.is_unlocked(achievement) { "x" } else { " " };
        println!(
            "[{mark}] {:<14} {}",
            achievement.name(),
            achievement.description()
        );
    }
    println!("Coins: {}", progress.coins);
}

fn shop(store: &mut JsonFileStore, action: ShopAction) -> Result<()> {
    let mut progress = store.progress_or_default();

    match action {
        ShopAction::List => {
            println!("Coins: {}", progress.coins);
            for skin in Skin::ALL {
                let status = if progress.equipped_skin == skin {
                    "equipped".to_string()
                } else if progress.owns_skin(skin) {
                    "owned".to_string()
                } else {
                    format!("{} coins", skin.price())
                };
                println!("{:<8} {}", skin, status);
            }
            return Ok(());
        }
        ShopAction::Buy { skin } => match progress.purchase_skin(skin)? {
            PurchaseOutcome::Purchased { price } => {
                println!("Purchased {skin} for {price} coins.")
            }
            PurchaseOutcome::Equipped => println!("Equipped {skin} skin."),
        },
        ShopAction::Equip { skin } => {
            progress.equip_skin(skin)?;
            println!("Equipped {skin} skin.");
        }
    }

    store
        .save_progress(&progress)
        .context("Failed to save progress")
}

fn reset_progress(store: &mut JsonFileStore, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!("This forgets best score, coins, achievements and skins. Re-run with --yes.");
        return Ok(());
    }

    let mut progress = store.progress_or_default();
    progress.reset();
    store
        .save_progress(&progress)
        .context("Failed to save progress")?;
    info!("progress reset");
    println!("Progress reset.");
    Ok(())
}
