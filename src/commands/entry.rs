use chrono::Local;
use clap::Args;
use std::path::PathBuf;

use procure_core::models::{photo_from_path, split_color_tokens};
use procure_core::{EntryForm, ExportSettings, ProcurementRecord, StoreId, Unit};

use super::export::export_record;
use super::App;
use crate::config::Config;

/// Fields shared by `add` and `edit`
#[derive(Args)]
pub struct RecordFields {
    /// Supplier (defaults to the last one used)
    #[arg(long, short)]
    supplier: Option<String>,

    /// Color text for the card; derived from the allocations when empty
    #[arg(long)]
    color: Option<String>,

    /// Unit: piece (件) or pack (包)
    #[arg(long, short)]
    unit: Option<Unit>,

    /// Cost price
    #[arg(long)]
    cost: Option<f64>,

    /// Selling price
    #[arg(long)]
    sell: Option<f64>,

    /// Product photo (PNG, JPEG, WebP or GIF)
    #[arg(long, short, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Quantity for a store, e.g. `3:黑色=2` (repeatable; 0 clears the cell)
    #[arg(long = "alloc", short, value_name = "STORE[:COLOR]=QTY")]
    allocations: Vec<String>,
}

impl RecordFields {
    fn apply(&self, form: &mut EntryForm) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(supplier) = &self.supplier {
            form.supplier = supplier.clone();
        }
        if let Some(color) = &self.color {
            form.color = color.clone();
        }
        if let Some(unit) = self.unit {
            form.unit = unit;
        }
        if let Some(cost) = self.cost {
            form.cost_price = non_negative("cost", cost)?;
        }
        if let Some(sell) = self.sell {
            form.sell_price = non_negative("sell", sell)?;
        }
        if let Some(path) = &self.image {
            form.set_image(photo_from_path(path)?);
        }

        for arg in &self.allocations {
            let parsed = parse_allocation(arg)?;
            let color = match parsed.color {
                Some(color) => color,
                None => single_color(&form.color)
                    .ok_or_else(|| format!("'{}': specify a color (STORE:COLOR=QTY)", arg))?,
            };
            form.set_quantity(parsed.store, &color, parsed.quantity);
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct AddCommand {
    /// Model / style number
    model: String,

    #[command(flatten)]
    fields: RecordFields,

    /// Stay on the entry screen for the next item
    #[arg(long)]
    stay: bool,

    /// Save without rendering or sending the card
    #[arg(long)]
    no_export: bool,
}

impl AddCommand {
    pub fn run(&self, app: &mut App, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut form = app.begin_entry();
        form.model = self.model.clone();
        self.fields.apply(&mut form)?;

        let record = app.submit(&mut form, Local::now(), self.stay)?;
        println!("Added record {}", record.short_id());
        println!();
        print!("{}", record);

        if !self.no_export {
            println!();
            export_saved(&record, &app.exporter_settings(), config);
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct EditCommand {
    /// Record ID (a unique prefix is enough)
    id: String,

    /// Model / style number
    #[arg(long, short)]
    model: Option<String>,

    #[command(flatten)]
    fields: RecordFields,

    /// Clear all allocations before applying --alloc
    #[arg(long)]
    reset_alloc: bool,

    /// Save without rendering or sending the card
    #[arg(long)]
    no_export: bool,
}

impl EditCommand {
    pub fn run(&self, app: &mut App, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut form = app.begin_edit(&self.id)?;
        if let Some(model) = &self.model {
            form.model = model.clone();
        }
        if self.reset_alloc {
            form.clear_allocations();
        }
        self.fields.apply(&mut form)?;

        let record = app.submit(&mut form, Local::now(), false)?;
        println!("Updated record {}", record.short_id());
        println!();
        print!("{}", record);

        if !self.no_export {
            println!();
            export_saved(&record, &app.exporter_settings(), config);
        }
        Ok(())
    }
}

/// Exports a record that is already saved. A failed export leaves the
/// record in place and only warns.
fn export_saved(record: &ProcurementRecord, settings: &ExportSettings, config: &Config) {
    if let Err(e) = export_record(record, settings, config) {
        tracing::warn!("Export of record {} failed: {}", record.short_id(), e);
        eprintln!("Warning: record saved, but the card was not exported: {}", e);
    }
}

/// One `--alloc` argument
#[derive(Debug, PartialEq)]
pub struct AllocationArg {
    pub store: StoreId,
    pub color: Option<String>,
    pub quantity: u32,
}

/// Parses `STORE[:COLOR]=QTY`.
pub fn parse_allocation(s: &str) -> Result<AllocationArg, String> {
    let (target, quantity) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Invalid allocation '{}'. Use STORE[:COLOR]=QTY.", s))?;

    let quantity: u32 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("Invalid quantity in '{}'", s))?;

    let (store, color) = match target.split_once(':') {
        Some((store, color)) => {
            let color = color.trim();
            if color.is_empty() {
                return Err(format!("Empty color in '{}'", s));
            }
            (store, Some(color.to_string()))
        }
        None => (target, None),
    };

    let store: StoreId = store.trim().parse().map_err(|e| format!("{}", e))?;

    Ok(AllocationArg {
        store,
        color,
        quantity,
    })
}

/// The form's color field, if it names exactly one color.
fn single_color(color: &str) -> Option<String> {
    match split_color_tokens(color).as_slice() {
        [only] => Some(only.to_string()),
        _ => None,
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("--{} must be a non-negative number", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_core::{FileStore, Procurement};

    fn store(n: u8) -> StoreId {
        StoreId::new(n).unwrap()
    }

    #[test]
    fn test_parse_allocation_with_color() {
        let parsed = parse_allocation("3:黑色=2").unwrap();
        assert_eq!(
            parsed,
            AllocationArg {
                store: store(3),
                color: Some("黑色".to_string()),
                quantity: 2,
            }
        );
    }

    #[test]
    fn test_parse_allocation_without_color() {
        let parsed = parse_allocation("20=5").unwrap();
        assert_eq!(parsed.store, store(20));
        assert_eq!(parsed.color, None);
        assert_eq!(parsed.quantity, 5);
    }

    #[test]
    fn test_parse_allocation_zero_clears() {
        assert_eq!(parse_allocation("1:白色=0").unwrap().quantity, 0);
    }

    #[test]
    fn test_parse_allocation_errors() {
        assert!(parse_allocation("3:黑色").is_err());
        assert!(parse_allocation("3:黑色=-1").is_err());
        assert!(parse_allocation("3:黑色=two").is_err());
        assert!(parse_allocation("3:=2").is_err());
        assert!(parse_allocation("0:黑色=2").is_err());
        assert!(parse_allocation("21:黑色=2").is_err());
        assert!(parse_allocation("x:黑色=2").is_err());
    }

    #[test]
    fn test_single_color() {
        assert_eq!(single_color(" 黑色 "), Some("黑色".to_string()));
        assert_eq!(single_color("黑色 白色"), None);
        assert_eq!(single_color(""), None);
    }

    #[test]
    fn test_apply_fields() {
        let fields = RecordFields {
            supplier: Some("华南布行".to_string()),
            color: Some("黑色".to_string()),
            unit: Some(Unit::Pack),
            cost: Some(35.0),
            sell: Some(89.0),
            image: None,
            allocations: vec!["3=2".to_string(), "1:白色=1".to_string()],
        };

        let mut form = EntryForm::new("");
        fields.apply(&mut form).unwrap();

        assert_eq!(form.supplier, "华南布行");
        assert_eq!(form.unit, Unit::Pack);
        assert_eq!(form.quantity(store(3), "黑色"), 2);
        assert_eq!(form.quantity(store(1), "白色"), 1);
        assert_eq!(form.total_quantity(), 3);
    }

    #[test]
    fn test_add_succeeds_when_export_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let photo = temp_dir.path().join("photo.png");
        std::fs::write(&photo, b"\x89PNG\r\n\x1a\n0000").unwrap();

        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "data_dir: data\ndownload_dir: cards\nfont_path: /nonexistent/font.ttf\n",
        )
        .unwrap();
        let config = Config::load(Some(config_path)).unwrap();

        let add = AddCommand {
            model: "A123".to_string(),
            fields: RecordFields {
                supplier: Some("华南布行".to_string()),
                color: Some("黑色".to_string()),
                unit: None,
                cost: None,
                sell: None,
                image: Some(photo),
                allocations: vec!["3=2".to_string()],
            },
            stay: false,
            no_export: false,
        };

        let mut app: App = Procurement::open(FileStore::new(config.data_dir.value.clone()));
        add.run(&mut app, &config).unwrap();

        let reopened: App = Procurement::open(FileStore::new(config.data_dir.value.clone()));
        assert_eq!(reopened.records().len(), 1);
        assert!(!temp_dir.path().join("cards").exists());
    }

    #[test]
    fn test_apply_rejects_negative_price() {
        let fields = RecordFields {
            supplier: None,
            color: None,
            unit: None,
            cost: Some(-1.0),
            sell: None,
            image: None,
            allocations: vec![],
        };
        assert!(fields.apply(&mut EntryForm::new("")).is_err());
    }
}
