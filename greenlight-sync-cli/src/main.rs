//! greenlight-sync CLI
//!
//! Command-line front end for syncing the Xbox cloud-gaming catalog into
//! an ES-DE library: launch scripts, media assets and gamelist.xml.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod spinner;

#[derive(Parser)]
#[command(name = "greenlight-sync")]
#[command(about = "Sync the Xbox cloud-gaming catalog into an ES-DE library", long_about = None)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog and synchronize scripts, assets and the gamelist
    Sync {
        /// Base directory for downloaded media (default: saved setting)
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Directory for generated launch scripts
        #[arg(long)]
        scripts_dir: Option<PathBuf>,

        /// Path of the gamelist.xml to maintain
        #[arg(long)]
        gamelist: Option<PathBuf>,

        /// Directory for the sync state file and catalog cache
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Asset kinds to download (e.g., logos,covers,fanart,videos)
        #[arg(long, value_delimiter = ',')]
        kinds: Option<Vec<String>>,

        /// Skip video downloads
        #[arg(long)]
        skip_videos: bool,

        /// Re-download these kinds even when nothing changed
        #[arg(long, value_delimiter = ',')]
        force_redownload: Option<Vec<String>>,

        /// Number of games processed concurrently
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Bypass the catalog day-cache
        #[arg(long)]
        refresh: bool,

        /// Show the plan without downloading or writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Delete stored assets of the given kinds across all synced games
    Clean {
        /// Kinds to delete (e.g., videos or logos,covers)
        #[arg(value_delimiter = ',')]
        kinds: Vec<String>,

        /// Directory holding the sync state file
        #[arg(long)]
        state_dir: Option<PathBuf>,
    },

    /// Add the Greenlight system to an ES-DE custom systems file
    Integrate {
        /// Path to ES-DE's custom es_systems.xml
        #[arg(long)]
        es_systems: PathBuf,

        /// Directory the launch scripts live in
        #[arg(long)]
        scripts_dir: Option<PathBuf>,
    },

    /// Inspect the shared settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Print the settings file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.quiet);

    let ok = match cli.command {
        Commands::Sync {
            assets_dir,
            scripts_dir,
            gamelist,
            state_dir,
            kinds,
            skip_videos,
            force_redownload,
            workers,
            refresh,
            dry_run,
        } => commands::sync::run_sync(commands::sync::SyncArgs {
            assets_dir,
            scripts_dir,
            gamelist,
            state_dir,
            kinds,
            skip_videos,
            force_redownload,
            workers,
            refresh,
            dry_run,
            quiet: cli.quiet,
        }),
        Commands::Clean { kinds, state_dir } => commands::clean::run_clean(kinds, state_dir),
        Commands::Integrate {
            es_systems,
            scripts_dir,
        } => commands::integrate::run_integrate(&es_systems, scripts_dir),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_show(),
            ConfigAction::Path => commands::config::run_path(),
        },
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Console output goes through the `log` facade; the default format is
/// message-only so info-level lines read as normal CLI output.
fn init_logger(quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
