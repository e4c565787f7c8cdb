use chrono::Local;
use clap::Args;

use procure_core::export::{format_colors, format_stores};
use procure_core::ProcurementRecord;

use procure_core::Tab;

use super::{confirm, screen_header, App, OutputFormat};

#[derive(Args)]
pub struct ListCommand {
    /// Include records from every day, not just today
    #[arg(long, short)]
    all: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ListCommand {
    pub fn run(&self, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        let header = screen_header(app, Tab::List);
        let records: Vec<&ProcurementRecord> = if self.all {
            app.records().records().iter().collect()
        } else {
            app.records().on_date(Local::now().date_naive())
        };

        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        println!("{}\n", header);
        if records.is_empty() {
            if self.all {
                println!("No records found.");
            } else {
                println!("No records today.");
            }
            return Ok(());
        }

        println!(
            "{:<10} {:<6} {:<12} {:<14} {:<12} {:>6}  STORES",
            "ID", "TIME", "MODEL", "COLOR", "SUPPLIER", "QTY"
        );
        println!("{}", "-".repeat(80));

        for record in &records {
            let time = record
                .created_at()
                .map(|dt| {
                    if self.all {
                        dt.format("%m-%d").to_string()
                    } else {
                        dt.format("%H:%M").to_string()
                    }
                })
                .unwrap_or_default();
            println!(
                "{:<10} {:<6} {:<12} {:<14} {:<12} {:>5}{}  {}",
                record.short_id(),
                time,
                truncate(&record.model, 12),
                truncate(&format_colors(&record.color), 14),
                truncate(&record.supplier, 12),
                record.total_quantity(),
                record.unit,
                format_stores(record)
            );
        }

        let total: u64 = records.iter().map(|r| r.total_quantity()).sum();
        println!("\nTotal: {} record(s), {} item(s)", records.len(), total);
        Ok(())
    }
}

#[derive(Args)]
pub struct ClearTodayCommand {
    /// Skip confirmation prompt
    #[arg(long, short)]
    force: bool,
}

impl ClearTodayCommand {
    pub fn run(&self, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        let now = Local::now();
        let count = app.records().on_date(now.date_naive()).len();
        if count == 0 {
            println!("No records today.");
            return Ok(());
        }

        if !self.force && !confirm(&format!("Delete all {} record(s) from today?", count))? {
            println!("Cancelled.");
            return Ok(());
        }

        let removed = app.clear_today(now)?;
        println!("Cleared {} record(s).", removed);
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("A123", 12), "A123");
        assert_eq!(truncate("黑色白色灰色", 4), "黑色白…");
    }
}
