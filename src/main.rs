//! # Main — CLI Entry Point
//!
//! Routes CLI subcommands to the server and maintenance operations. `serve`
//! runs the HTTP API, `init-db` applies the schema, `today` prints the
//! current day's state, and `leaderboard` prints the top players.
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection for game storage.
//! - `--allowed-tries` / `ALLOWED_TRIES`: guesses each player gets per day.
//! - `--keep-history` / `KEEP_HISTORY`: persist individual guess records.
//! - `--tz-offset-hours` / `TZ_OFFSET_HOURS`: fixed UTC offset for the daily boundary.
//! - `--jwt-secret` / `JWT_SECRET`: HS256 signing secret for session tokens.
//! - `--number-seed` / `NUMBER_SEED`: deterministic daily number generation.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use mysterd::{config, db, game, server};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mysterd", about = "Daily mystery number guessing game server")]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Guesses each player gets per day
    #[arg(long, env = "ALLOWED_TRIES", default_value_t = game::DEFAULT_ALLOWED_TRIES)]
    allowed_tries: i32,

    /// Persist individual guess records (enables /api/game/history)
    #[arg(long, env = "KEEP_HISTORY")]
    keep_history: bool,

    /// Fixed UTC offset in whole hours for the daily boundary
    #[arg(long, env = "TZ_OFFSET_HOURS", default_value_t = 0)]
    tz_offset_hours: i32,

    /// HS256 signing secret for session tokens (or set JWT_SECRET env var)
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Seed for deterministic daily numbers (omit for OS entropy)
    #[arg(long, env = "NUMBER_SEED")]
    number_seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Directory to serve static files from (defaults to the built-in page)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Apply the database schema (idempotent)
    InitDb {
        /// Also insert the demo account (bob / bobpass)
        #[arg(long)]
        seed_demo: bool,
    },
    /// Show today's mystery number state
    Today {
        /// Print the target number as well
        #[arg(long)]
        reveal: bool,
    },
    /// Print the success-rate leaderboard
    Leaderboard {
        /// Number of rows to print
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

fn settings_from_cli(cli: &Cli) -> Result<config::Settings> {
    let jwt_secret = match &cli.jwt_secret {
        Some(s) => s.clone(),
        None => {
            tracing::warn!("JWT_SECRET not set, using the built-in development secret");
            config::DEV_JWT_SECRET.to_string()
        }
    };
    let settings = config::Settings {
        allowed_tries: cli.allowed_tries,
        keep_history: cli.keep_history,
        tz_offset_hours: cli.tz_offset_hours,
        number_seed: cli.number_seed,
        jwt_secret,
    };
    settings.validate()?;
    Ok(settings)
}

async fn run_init_db(database_url: &str, seed_demo: bool) -> Result<()> {
    let database = db::Database::connect(database_url).await?;
    database.init_schema().await?;
    println!("schema applied");
    if seed_demo {
        let digest = server::auth::hash_password("bobpass");
        database.seed_demo_user("bob", "bob@mail.com", &digest).await?;
        println!("demo user ready (bob / bobpass)");
    }
    Ok(())
}

async fn run_today(database_url: &str, settings: &config::Settings, reveal: bool) -> Result<()> {
    let database = db::Database::connect(database_url).await?;
    let mystery = database
        .get_or_create_today(
            chrono::Utc::now(),
            settings.offset_secs(),
            settings.number_seed,
        )
        .await?;
    println!("day_key:   {}", mystery.day_key);
    println!("tries:     {}", mystery.tries);
    println!("finished:  {}", mystery.attempts);
    println!("solved:    {}", mystery.successes);
    if reveal {
        println!("number:    {:04}", mystery.number);
    }
    Ok(())
}

async fn run_leaderboard(database_url: &str, limit: i64) -> Result<()> {
    let database = db::Database::connect(database_url).await?;
    let rows = database.get_leaderboard(limit).await?;
    if rows.is_empty() {
        println!("no players yet");
        return Ok(());
    }
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<24} rate {:>5.1}%  solved {:>4}  days {:>4}",
            i + 1,
            row.username,
            row.success_rate * 100.0,
            row.successes,
            row.attempts,
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for K8s, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let settings = settings_from_cli(&cli)?;
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    match &cli.command {
        Commands::Serve { port, static_dir } => rt.block_on(server::run(
            *port,
            database_url,
            settings,
            static_dir.as_deref(),
        )),
        Commands::InitDb { seed_demo } => rt.block_on(run_init_db(database_url, *seed_demo)),
        Commands::Today { reveal } => rt.block_on(run_today(database_url, &settings, *reveal)),
        Commands::Leaderboard { limit } => rt.block_on(run_leaderboard(database_url, *limit)),
    }
}
