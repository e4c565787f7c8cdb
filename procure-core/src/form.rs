//! Entry form: collects one record's fields and per-store allocations.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    derive_allocations, ColorQty, ProcurementRecord, StoreAllocation, StoreId, StoreTotal, Unit,
};

/// Reasons a submission is rejected. Nothing is saved when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Model cannot be empty")]
    EmptyModel,

    #[error("Allocate at least one item to a store")]
    NoQuantity,

    #[error("A product photo is required")]
    MissingImage,
}

/// Identity of the record being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EditTarget {
    id: String,
    timestamp: i64,
}

/// Edit buffer for a single record.
#[derive(Debug, Clone)]
pub struct EntryForm {
    editing: Option<EditTarget>,
    pub supplier: String,
    pub model: String,
    pub color: String,
    pub unit: Unit,
    pub cost_price: f64,
    pub sell_price: f64,
    image: Option<String>,
    detail: Vec<StoreAllocation>,
}

impl EntryForm {
    /// Blank form pre-filled with the last-used supplier.
    pub fn new(supplier: impl Into<String>) -> Self {
        Self {
            editing: None,
            supplier: supplier.into(),
            model: String::new(),
            color: String::new(),
            unit: Unit::default(),
            cost_price: 0.0,
            sell_price: 0.0,
            image: None,
            detail: Vec::new(),
        }
    }

    /// Form pre-seeded from an existing record; submitting keeps its id and
    /// timestamp.
    pub fn edit(record: &ProcurementRecord) -> Self {
        Self {
            editing: Some(EditTarget {
                id: record.id.clone(),
                timestamp: record.timestamp,
            }),
            supplier: record.supplier.clone(),
            model: record.model.clone(),
            color: record.color.clone(),
            unit: record.unit,
            cost_price: record.cost_price,
            sell_price: record.sell_price,
            image: (!record.image.is_empty()).then(|| record.image.clone()),
            detail: record.detail_allocations.clone(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Id of the record being edited, if any.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|t| t.id.as_str())
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn set_image(&mut self, data_uri: impl Into<String>) {
        self.image = Some(data_uri.into());
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// The allocation table, in the order stores were first allocated.
    pub fn detail(&self) -> &[StoreAllocation] {
        &self.detail
    }

    pub fn quantity(&self, store: StoreId, color: &str) -> u32 {
        self.detail
            .iter()
            .find(|a| a.store_id == store)
            .and_then(|a| a.items.iter().find(|i| i.color == color))
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Sets one cell of the allocation table.
    ///
    /// A quantity of zero removes the cell; a store left without cells is
    /// dropped from the table.
    pub fn set_quantity(&mut self, store: StoreId, color: &str, quantity: u32) {
        let index = match self.detail.iter().position(|a| a.store_id == store) {
            Some(index) => index,
            None if quantity == 0 => return,
            None => {
                self.detail.push(StoreAllocation::new(store));
                self.detail.len() - 1
            }
        };

        let items = &mut self.detail[index].items;
        match items.iter().position(|i| i.color == color) {
            Some(i) if quantity == 0 => {
                items.remove(i);
            }
            Some(i) => items[i].quantity = quantity,
            None if quantity > 0 => items.push(ColorQty::new(color, quantity)),
            None => {}
        }

        if self.detail[index].items.is_empty() {
            self.detail.remove(index);
        }
    }

    /// Steps a cell up or down, saturating at zero.
    pub fn adjust(&mut self, store: StoreId, color: &str, delta: i64) {
        let current = i64::from(self.quantity(store, color));
        let next = (current + delta).clamp(0, i64::from(u32::MAX)) as u32;
        self.set_quantity(store, color, next);
    }

    pub fn clear_store(&mut self, store: StoreId) {
        self.detail.retain(|a| a.store_id != store);
    }

    pub fn clear_allocations(&mut self) {
        self.detail.clear();
    }

    pub fn allocations(&self) -> Vec<StoreTotal> {
        derive_allocations(&self.detail)
    }

    pub fn total_quantity(&self) -> u64 {
        self.detail.iter().map(StoreAllocation::total).sum()
    }

    /// Checks the minimal submission requirements.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.model.trim().is_empty() {
            return Err(FormError::EmptyModel);
        }
        if self.total_quantity() == 0 {
            return Err(FormError::NoQuantity);
        }
        if self.image.as_deref().map_or(true, str::is_empty) {
            return Err(FormError::MissingImage);
        }
        Ok(())
    }

    /// Builds the finished record and resets the buffer for the next entry.
    ///
    /// `now_ms` is the creation time for new records; edits keep their
    /// original timestamp. The supplier survives the reset.
    pub fn submit(&mut self, now_ms: i64) -> Result<ProcurementRecord, FormError> {
        self.validate()?;

        let (id, timestamp) = match self.editing.take() {
            Some(target) => (target.id, target.timestamp),
            None => (Uuid::new_v4().to_string(), now_ms),
        };

        let color = match self.color.trim() {
            "" => self.allocation_colors().join(" "),
            given => given.to_string(),
        };

        let record = ProcurementRecord {
            id,
            timestamp,
            supplier: self.supplier.trim().to_string(),
            model: self.model.trim().to_string(),
            color,
            unit: self.unit,
            cost_price: self.cost_price,
            sell_price: self.sell_price,
            image: self.image.take().unwrap_or_default(),
            detail_allocations: std::mem::take(&mut self.detail),
        };

        *self = Self::new(record.supplier.clone());
        Ok(record)
    }

    /// Discards all in-progress edits.
    pub fn cancel(self) {}

    /// Distinct colors in the table, in first-seen order.
    fn allocation_colors(&self) -> Vec<&str> {
        let mut colors: Vec<&str> = Vec::new();
        for item in self.detail.iter().flat_map(|a| a.items.iter()) {
            if !colors.contains(&item.color.as_str()) {
                colors.push(&item.color);
            }
        }
        colors
    }
}
