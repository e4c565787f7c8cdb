use clap::Args;

use procure_core::export::format_stores;

use super::export::export_record;
use super::{confirm, resolve_record, App, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ShowCommand {
    /// Record ID (a unique prefix is enough)
    id: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ShowCommand {
    pub fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let record = resolve_record(app, &self.id)?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            OutputFormat::Text => {
                print!("{}", record);
                println!("Stores: {}", format_stores(&record));
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct DeleteCommand {
    /// Record ID (a unique prefix is enough)
    id: String,

    /// Skip confirmation prompt
    #[arg(long, short)]
    force: bool,
}

impl DeleteCommand {
    pub fn run(&self, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        let record = resolve_record(app, &self.id)?;

        if !self.force {
            let prompt = format!("Delete record '{}' ({})?", record.model, record.short_id());
            if !confirm(&prompt)? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        app.delete(&record.id)?;
        println!("Deleted record: {} ({})", record.model, record.short_id());
        Ok(())
    }
}

#[derive(Args)]
pub struct ExportCommand {
    /// Record ID (a unique prefix is enough)
    id: String,
}

impl ExportCommand {
    pub fn run(&self, app: &App, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let record = resolve_record(app, &self.id)?;
        export_record(&record, &app.exporter_settings(), config)
    }
}
