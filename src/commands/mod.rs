mod config_cmd;
mod entry;
mod export;
mod record;
mod settings;
mod summary;
mod today;

pub use config_cmd::ConfigCommand;
pub use entry::{AddCommand, EditCommand};
pub use record::{DeleteCommand, ExportCommand, ShowCommand};
pub use settings::SettingsCommand;
pub use summary::SummaryCommand;
pub use today::{ClearTodayCommand, ListCommand};

use clap::ValueEnum;
use std::io::{self, Write};

use procure_core::{FileStore, Procurement, ProcurementRecord, Tab};

/// The application context the commands operate on.
pub type App = Procurement<FileStore>;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Switches to `tab` and renders its header line.
fn screen_header(app: &mut App, tab: Tab) -> String {
    app.select(tab);
    let header = app.header();
    match header.supplier_badge {
        Some(badge) => format!("{} [{}]  {}", header.title, badge, header.subtitle),
        None => format!("{}  {}", header.title, header.subtitle),
    }
}

/// Resolves a full or abbreviated record id.
fn resolve_record(app: &App, id: &str) -> Result<ProcurementRecord, Box<dyn std::error::Error>> {
    app.records()
        .find_by_prefix(id)
        .cloned()
        .ok_or_else(|| format!("Record not found (or ambiguous): {}", id).into())
}

/// Asks a yes/no question on stdin. Anything but `y` is a no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
