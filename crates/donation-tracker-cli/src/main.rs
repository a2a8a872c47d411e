use clap::{Parser, Subcommand};
use donation_tracker_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "donation-tracker", version, about = "Blood donation cycle tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cycle state as JSON
    Status,
    /// Set up the profile from an earlier donation
    Init {
        /// Display name
        #[arg(long)]
        name: String,
        /// Donations made so far
        #[arg(long, default_value = "0")]
        count: u32,
        /// Date of the last donation (YYYY-MM-DD, local)
        #[arg(long)]
        date: chrono::NaiveDate,
    },
    /// Record a donation made today
    Record,
    /// Clear all stored data
    Reset,
    /// Show a live countdown until the next donation
    Watch {
        /// Render a single frame and exit
        #[arg(long)]
        once: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let (config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    logging::init(&config.log.level);
    if let Some(e) = config_err {
        tracing::warn!(error = %e, "using default configuration");
    }

    let result = match cli.command {
        Commands::Status => commands::cycle::status(&config),
        Commands::Init { name, count, date } => commands::cycle::init(&config, &name, count, date),
        Commands::Record => commands::cycle::record(&config),
        Commands::Reset => commands::cycle::reset(&config),
        Commands::Watch { once } => commands::watch::run(&config, once),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
