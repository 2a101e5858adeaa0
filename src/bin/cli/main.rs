mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kaizen-cli", about = "Kaizen progression engine CLI", version)]
struct Cli {
    /// Data directory (default: platform local data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Engine rules as TOML
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lessons and cards as JSON (default: catalog.json in the data dir)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show hearts, streak, XP and due reviews of a user
    Status {
        user: Uuid,
    },

    /// Start a lesson (needs at least one heart)
    Start {
        user: Uuid,
        lesson: Uuid,
        /// IANA timezone used when the profile is created
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Record a finished lesson attempt and grant cards
    Complete {
        user: Uuid,
        lesson: Uuid,
        /// Score 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        score: u8,
        /// Hearts lost during the attempt
        #[arg(long, default_value = "0")]
        hearts_lost: u32,
        /// Spaced-repetition review
        #[arg(long)]
        review: bool,
        /// Legendary (hard mode) run
        #[arg(long)]
        legendary: bool,
        /// IANA timezone used when the profile is created
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Show the level reached with a total XP
    Level {
        xp: u64,
    },

    /// List cards owned and still locked
    Cards {
        user: Uuid,
        /// Show only owned cards
        #[arg(long)]
        owned: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(
        cli.data_dir.as_deref(),
        cli.config.as_deref(),
        cli.catalog.as_deref(),
    )?;

    match cli.command {
        Command::Status { user } => {
            commands::status::run(&app, user, &cli.format)?;
        }
        Command::Start {
            user,
            lesson,
            timezone,
        } => {
            commands::start::run(&app, user, lesson, &timezone, &cli.format)?;
        }
        Command::Complete {
            user,
            lesson,
            score,
            hearts_lost,
            review,
            legendary,
            timezone,
        } => {
            let attempt = kaizen_lib::session::LessonAttempt {
                score,
                hearts_lost,
                review,
                legendary,
            };
            commands::complete::run(&app, user, lesson, &attempt, &timezone, &cli.format)?;
        }
        Command::Level { xp } => {
            commands::level::run(&app, xp, &cli.format)?;
        }
        Command::Cards { user, owned } => {
            commands::cards::run(&app, user, owned, &cli.format)?;
        }
    }

    Ok(())
}
