use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AddCommand, App, ClearTodayCommand, ConfigCommand, DeleteCommand, EditCommand, ExportCommand,
    ListCommand, SettingsCommand, ShowCommand, SummaryCommand,
};
use config::Config;
use procure_core::{FileStore, Procurement};

#[derive(Parser)]
#[command(name = "procure")]
#[command(version)]
#[command(about = "Log purchased items and share procurement cards", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a purchased item and export its card
    Add(AddCommand),

    /// Change a record and export its card again
    Edit(EditCommand),

    /// Show a record
    Show(ShowCommand),

    /// Delete a record
    Delete(DeleteCommand),

    /// Render and send a record's card
    Export(ExportCommand),

    /// List today's records
    List(ListCommand),

    /// Delete every record created today
    ClearToday(ClearTodayCommand),

    /// Totals for a day
    Summary(SummaryCommand),

    /// Manage supplier, colors and webhook
    Settings(SettingsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "procure=warn,procure_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    let mut app: App = Procurement::open(FileStore::new(config.data_dir.value.clone()));

    match &cli.command {
        Some(Commands::Add(cmd)) => cmd.run(&mut app, &config),
        Some(Commands::Edit(cmd)) => cmd.run(&mut app, &config),
        Some(Commands::Show(cmd)) => cmd.run(&app),
        Some(Commands::Delete(cmd)) => cmd.run(&mut app),
        Some(Commands::Export(cmd)) => cmd.run(&app, &config),
        Some(Commands::List(cmd)) => cmd.run(&mut app),
        Some(Commands::ClearToday(cmd)) => cmd.run(&mut app),
        Some(Commands::Summary(cmd)) => cmd.run(&mut app),
        Some(Commands::Settings(cmd)) => cmd.run(&mut app),
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path),
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}
