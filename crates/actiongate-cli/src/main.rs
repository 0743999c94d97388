mod cmd;
mod logging;
mod output;

use actiongate_core::config::{default_config_path, exe_dir};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actiongate",
    about = "Expose administrator-defined local actions as authenticated HTTP endpoints",
    version,
    propagate_version = true
)]
struct Cli {
    /// Configuration file (default: config.yaml next to the executable)
    #[arg(long, global = true, env = "ACTIONGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory for `serve` (default: logs/ next to the executable)
    #[arg(long, global = true, env = "ACTIONGATE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the configured actions (default)
    Serve,

    /// Print the routes the configuration produces
    Routes {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Validate the configuration and exit
    Check,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    let daemon = matches!(command, Commands::Serve);
    match command {
        Commands::Serve => {
            let log_dir = cli.log_dir.unwrap_or_else(|| exe_dir().join("logs"));
            logging::init_daemon(&log_dir);
            tracing::info!(
                args = ?std::env::args().collect::<Vec<_>>(),
                cwd = ?std::env::current_dir().ok(),
                "Start"
            );
        }
        Commands::Routes { .. } | Commands::Check => logging::init_console(),
    }

    let config_path = cli.config.unwrap_or_else(default_config_path);

    let result = match command {
        Commands::Serve => cmd::serve::run(&config_path),
        Commands::Routes { json } => cmd::routes::run(&config_path, json),
        Commands::Check => cmd::check::run(&config_path),
    };

    if let Err(e) = result {
        if daemon {
            tracing::error!("{e:#}");
        }
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
