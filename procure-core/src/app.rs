//! Application context tying the stores, presets and router together.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::export::ExportSettings;
use crate::form::{EntryForm, FormError};
use crate::models::ProcurementRecord;
use crate::presets::{PresetRegistry, Presets};
use crate::router::{Action, Header, Router, Tab};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::RecordStore;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Single owner of all procurement state.
pub struct Procurement<S: KeyValueStore + Clone> {
    records: RecordStore<S>,
    presets: PresetRegistry<S>,
    router: Router,
}

impl<S: KeyValueStore + Clone> Procurement<S> {
    /// Loads records and presets from `storage`.
    pub fn open(storage: S) -> Self {
        Self {
            records: RecordStore::load(storage.clone()),
            presets: PresetRegistry::load(storage),
            router: Router::new(),
        }
    }

    pub fn records(&self) -> &RecordStore<S> {
        &self.records
    }

    pub fn presets(&self) -> &Presets {
        self.presets.presets()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn header(&self) -> Header {
        self.router.header(self.presets.supplier())
    }

    pub fn select(&mut self, tab: Tab) -> Tab {
        self.router.transition(Action::Select(tab))
    }

    /// Opens a blank entry form carrying the last supplier.
    pub fn begin_entry(&mut self) -> EntryForm {
        self.router.transition(Action::Select(Tab::Entry));
        EntryForm::new(self.presets.supplier())
    }

    /// Opens the record matching `id` (or a unique prefix of it) for editing.
    pub fn begin_edit(&mut self, id: &str) -> Result<EntryForm, AppError> {
        let record = self
            .records
            .find_by_prefix(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let form = EntryForm::edit(&record);
        self.router.transition(Action::Edit(Box::new(record)));
        Ok(form)
    }

    /// Validates and saves the form, then leaves the entry screen unless
    /// `stay` is set.
    ///
    /// A rejected form leaves the store, presets and screen untouched.
    pub fn submit(
        &mut self,
        form: &mut EntryForm,
        now: DateTime<Local>,
        stay: bool,
    ) -> Result<ProcurementRecord, AppError> {
        let record = form.submit(now.timestamp_millis())?;
        let replaced = self.records.add(record.clone())?;
        self.presets.set_supplier(record.supplier.clone())?;
        self.router.transition(Action::Complete { stay });

        tracing::info!(
            "{} record {} ({} x{})",
            if replaced { "Updated" } else { "Added" },
            record.short_id(),
            record.model,
            record.total_quantity()
        );
        Ok(record)
    }

    pub fn cancel(&mut self, form: EntryForm) {
        form.cancel();
        self.router.transition(Action::Cancel);
    }

    pub fn delete(&mut self, id: &str) -> Result<Option<ProcurementRecord>, AppError> {
        Ok(self.records.remove(id)?)
    }

    pub fn clear_today(&mut self, now: DateTime<Local>) -> Result<usize, AppError> {
        Ok(self.records.clear_today(now)?)
    }

    /// Drops every record. Presets are kept.
    pub fn clear_all(&mut self) -> Result<usize, AppError> {
        let removed = self.records.clear_all()?;
        tracing::info!("Cleared all records ({})", removed);
        Ok(removed)
    }

    /// Restores default supplier, colors, webhook and target group.
    pub fn reset_presets(&mut self) -> Result<(), AppError> {
        self.presets.reset()?;
        tracing::info!("Restored default presets");
        Ok(())
    }

    pub fn set_supplier(&mut self, supplier: impl Into<String>) -> Result<(), AppError> {
        Ok(self.presets.set_supplier(supplier)?)
    }

    pub fn add_color(&mut self, color: &str) -> Result<bool, AppError> {
        Ok(self.presets.add_color(color)?)
    }

    pub fn remove_color(&mut self, color: &str) -> Result<bool, AppError> {
        Ok(self.presets.remove_color(color)?)
    }

    pub fn set_webhook(&mut self, url: impl Into<String>) -> Result<(), AppError> {
        Ok(self.presets.set_webhook(url)?)
    }

    pub fn set_target_group(&mut self, group: impl Into<String>) -> Result<(), AppError> {
        Ok(self.presets.set_target_group(group)?)
    }

    pub fn exporter_settings(&self) -> ExportSettings {
        let presets = self.presets.presets();
        ExportSettings {
            webhook_url: presets.webhook().map(str::to_string),
            target_group: presets.group().map(str::to_string),
        }
    }
}
