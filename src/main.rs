//! `flap-track` - play, then look at how you did.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use flap_track::cli::{Cli, Command, ConfigCommand};
use flap_track::{Config, SessionLog, Summary, app, init_file_logging, init_logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(path) = &cli.log_path {
        config.storage.log_path = Some(path.clone());
    }

    match cli.subcommand() {
        Command::Play => {
            init_file_logging(cli.verbosity(), &config.diagnostics_path())
                .context("opening the diagnostics log")?;
            let seed = cli.seed.unwrap_or_else(rand::random);
            app::run_game(&config, seed, cli.mute).context("running the game")
        }
        Command::Dashboard => {
            init_file_logging(cli.verbosity(), &config.diagnostics_path())
                .context("opening the diagnostics log")?;
            app::run_dashboard(&config).context("running the dashboard")
        }
        Command::Stats(stats) => {
            init_logging(cli.verbosity());
            handle_stats(&config, stats.json)
        }
        Command::Config(cmd) => {
            init_logging(cli.verbosity());
            handle_config(&config, cli.config.clone(), cmd)
        }
    }
}

fn handle_stats(config: &Config, json: bool) -> anyhow::Result<()> {
    let log = SessionLog::new(config.session_log_path());
    let records = log
        .read_all()
        .with_context(|| format!("reading {}", log.path().display()))?;
    let summary = Summary::from_records(&records);

    if json {
        let out = serde_json::json!({
            "total_games": summary.total_games,
            "highest_score": summary.highest_score,
            "average_score": summary.average_score,
            "log_path": log.path(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Games played:  {}", summary.total_games);
        println!("Highest score: {}", summary.highest_score);
        println!("Average score: {}", summary.average_label());
        println!("Log file:      {}", log.path().display());
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    custom_path: Option<std::path::PathBuf>,
    cmd: &ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Path => {
            let path = custom_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
