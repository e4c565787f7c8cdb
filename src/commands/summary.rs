use chrono::{Local, NaiveDate};
use clap::Args;

use procure_core::{DaySummary, Tab};

use super::{screen_header, App, OutputFormat};

#[derive(Args)]
pub struct SummaryCommand {
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SummaryCommand {
    pub fn run(&self, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        let date = match &self.date {
            Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d))?,
            None => Local::now().date_naive(),
        };

        let summary = DaySummary::for_date(app.records().records(), date);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => {
                println!("{}\n", screen_header(app, Tab::Summary));
                print_summary(&summary);
            }
        }
        Ok(())
    }
}

fn print_summary(summary: &DaySummary) {
    println!("{}", summary.date);
    println!("{}", "=".repeat(30));

    if summary.record_count == 0 {
        println!("No records.");
        return;
    }

    println!("Records:  {}", summary.record_count);
    println!("Quantity: {}", summary.total_quantity);
    println!("Cost:     {:.2}", summary.cost_total);
    println!("Sell:     {:.2}", summary.sell_total);
    println!("Margin:   {:.2}", summary.margin());

    println!("\nBy store:");
    for (store, qty) in &summary.per_store {
        println!("  {:>2}/  {}", store, qty);
    }

    println!("\nBy supplier:");
    for (supplier, qty) in &summary.per_supplier {
        println!("  {}  {}", supplier, qty);
    }
}
