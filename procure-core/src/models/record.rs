use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::store_id::StoreId;
use super::unit::Unit;

/// Quantity of one color allocated to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorQty {
    pub color: String,
    pub quantity: u32,
}

impl ColorQty {
    pub fn new(color: impl Into<String>, quantity: u32) -> Self {
        Self {
            color: color.into(),
            quantity,
        }
    }
}

/// Fine-grained allocation of an item to one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAllocation {
    pub store_id: StoreId,
    pub items: Vec<ColorQty>,
}

impl StoreAllocation {
    pub fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, color: impl Into<String>, quantity: u32) -> Self {
        self.items.push(ColorQty::new(color, quantity));
        self
    }

    /// Sum of all color quantities for this store.
    ///
    /// Cells are `u32`; totals are widened so they never overflow.
    pub fn total(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Coarse per-store total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTotal {
    pub store_id: StoreId,
    pub total_quantity: u64,
}

/// Aggregates a detail table into per-store totals, in table order.
pub fn derive_allocations(detail: &[StoreAllocation]) -> Vec<StoreTotal> {
    detail
        .iter()
        .map(|a| StoreTotal {
            store_id: a.store_id,
            total_quantity: a.total(),
        })
        .collect()
}

/// Splits a free-text color field into tokens.
///
/// Tokens may be separated by spaces, ASCII commas, full-width commas or the
/// enumeration comma; empty tokens are dropped.
pub fn split_color_tokens(raw: &str) -> Vec<&str> {
    raw.split(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | '、'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// One purchasing event.
///
/// Only the detail table is stored; `allocations` and `totalQuantity` are
/// always derived from it. Both are still written to JSON so persisted data
/// keeps its established shape, and are ignored when read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RecordWire", from = "RecordWire")]
pub struct ProcurementRecord {
    pub id: String,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    pub supplier: String,
    pub model: String,
    pub color: String,
    pub unit: Unit,
    pub cost_price: f64,
    pub sell_price: f64,
    /// Product photo as a data URI
    pub image: String,
    pub detail_allocations: Vec<StoreAllocation>,
}

impl ProcurementRecord {
    pub fn allocations(&self) -> Vec<StoreTotal> {
        derive_allocations(&self.detail_allocations)
    }

    pub fn total_quantity(&self) -> u64 {
        self.detail_allocations.iter().map(StoreAllocation::total).sum()
    }

    /// Stores holding at least one unit, ascending.
    pub fn allocated_stores(&self) -> BTreeSet<StoreId> {
        self.detail_allocations
            .iter()
            .filter(|a| a.total() > 0)
            .map(|a| a.store_id)
            .collect()
    }

    pub fn color_tokens(&self) -> Vec<&str> {
        split_color_tokens(&self.color)
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }

    /// Local calendar date the record was created on.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.created_at().map(|dt| dt.date_naive())
    }

    /// Prefix of the id used in listings.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

impl fmt::Display for ProcurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.model, self.color)?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "ID: {}", self.id)?;
        if let Some(created) = self.created_at() {
            writeln!(f, "Time: {}", created.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f, "Supplier: {}", self.supplier)?;
        writeln!(f, "Price: {} / {}", self.cost_price, self.sell_price)?;
        writeln!(f, "Total: {}{}", self.total_quantity(), self.unit)?;

        if !self.detail_allocations.is_empty() {
            writeln!(f, "\nAllocations:")?;
            for alloc in &self.detail_allocations {
                let items: Vec<String> = alloc
                    .items
                    .iter()
                    .map(|i| format!("{}×{}", i.color, i.quantity))
                    .collect();
                writeln!(f, "  {:>2}/  {}", alloc.store_id, items.join(", "))?;
            }
        }

        Ok(())
    }
}

/// Persisted JSON shape of a record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: String,
    timestamp: i64,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    cost_price: f64,
    #[serde(default)]
    sell_price: f64,
    #[serde(default)]
    color: String,
    #[serde(default)]
    unit: Unit,
    #[serde(default)]
    image: String,
    #[serde(default, skip_deserializing)]
    allocations: Vec<StoreTotal>,
    #[serde(default)]
    detail_allocations: Vec<StoreAllocation>,
    #[serde(default, skip_deserializing)]
    total_quantity: u64,
}

impl From<ProcurementRecord> for RecordWire {
    fn from(record: ProcurementRecord) -> Self {
        let allocations = record.allocations();
        let total_quantity = record.total_quantity();
        Self {
            id: record.id,
            timestamp: record.timestamp,
            supplier: record.supplier,
            model: record.model,
            cost_price: record.cost_price,
            sell_price: record.sell_price,
            color: record.color,
            unit: record.unit,
            image: record.image,
            allocations,
            detail_allocations: record.detail_allocations,
            total_quantity,
        }
    }
}

impl From<RecordWire> for ProcurementRecord {
    fn from(wire: RecordWire) -> Self {
        Self {
            id: wire.id,
            timestamp: wire.timestamp,
            supplier: wire.supplier,
            model: wire.model,
            color: wire.color,
            unit: wire.unit,
            cost_price: wire.cost_price,
            sell_price: wire.sell_price,
            image: wire.image,
            detail_allocations: merge_duplicate_stores(wire.detail_allocations),
        }
    }
}

/// Folds repeated store entries into the first occurrence.
fn merge_duplicate_stores(detail: Vec<StoreAllocation>) -> Vec<StoreAllocation> {
    let mut merged: Vec<StoreAllocation> = Vec::with_capacity(detail.len());
    for alloc in detail {
        match merged.iter_mut().find(|a| a.store_id == alloc.store_id) {
            Some(existing) => existing.items.extend(alloc.items),
            None => merged.push(alloc),
        }
    }
    merged
}
