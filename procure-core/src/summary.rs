//! Per-day aggregation for the summary screen.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ProcurementRecord, StoreId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub record_count: usize,
    pub total_quantity: u64,
    /// Σ cost price × quantity
    pub cost_total: f64,
    /// Σ sell price × quantity
    pub sell_total: f64,
    pub per_store: BTreeMap<StoreId, u64>,
    pub per_supplier: BTreeMap<String, u64>,
}

impl DaySummary {
    /// Aggregates the records created on `date` (local calendar).
    pub fn for_date<'a, I>(records: I, date: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a ProcurementRecord>,
    {
        let mut summary = DaySummary {
            date,
            record_count: 0,
            total_quantity: 0,
            cost_total: 0.0,
            sell_total: 0.0,
            per_store: BTreeMap::new(),
            per_supplier: BTreeMap::new(),
        };

        for record in records
            .into_iter()
            .filter(|r| r.local_date() == Some(date))
        {
            let qty = record.total_quantity();
            summary.record_count += 1;
            summary.total_quantity = summary.total_quantity.saturating_add(qty);
            summary.cost_total += record.cost_price * qty as f64;
            summary.sell_total += record.sell_price * qty as f64;

            for alloc in record.allocations() {
                if alloc.total_quantity > 0 {
                    let entry = summary.per_store.entry(alloc.store_id).or_default();
                    *entry = entry.saturating_add(alloc.total_quantity);
                }
            }

            let supplier = match record.supplier.trim() {
                "" => "-".to_string(),
                name => name.to_string(),
            };
            let entry = summary.per_supplier.entry(supplier).or_default();
            *entry = entry.saturating_add(qty);
        }

        summary
    }

    /// Expected gross margin for the day.
    pub fn margin(&self) -> f64 {
        self.sell_total - self.cost_total
    }
}
