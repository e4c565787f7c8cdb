//! Preset state: last supplier, preset colors, webhook target.

use serde::Serialize;

use crate::storage::{read_json, read_text, write_json, KeyValueStore, Slot, StorageError};

/// Colors offered before the user has customised the list.
pub const DEFAULT_COLORS: [&str; 10] = [
    "黑色", "白色", "灰色", "杏色", "-1", "-2", "-3", "-4", "-5", "-6",
];

/// Snapshot of the preset values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presets {
    pub supplier: String,
    pub colors: Vec<String>,
    pub webhook_url: String,
    pub target_group: String,
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            supplier: String::new(),
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            webhook_url: String::new(),
            target_group: String::new(),
        }
    }
}

impl Presets {
    pub fn webhook(&self) -> Option<&str> {
        non_blank(&self.webhook_url)
    }

    pub fn group(&self) -> Option<&str> {
        non_blank(&self.target_group)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Owns the preset values and writes each one to its own slot when it
/// changes.
pub struct PresetRegistry<S: KeyValueStore> {
    storage: S,
    presets: Presets,
}

impl<S: KeyValueStore> PresetRegistry<S> {
    /// Loads presets; absent or malformed slots keep their defaults.
    pub fn load(storage: S) -> Self {
        let mut presets = Presets::default();

        if let Some(supplier) = read_text(&storage, Slot::Supplier) {
            presets.supplier = supplier;
        }
        if let Some(colors) = read_json::<Vec<String>, _>(&storage, Slot::Colors) {
            presets.colors = dedupe(colors);
        }
        if let Some(url) = read_text(&storage, Slot::Webhook) {
            presets.webhook_url = url;
        }
        if let Some(group) = read_text(&storage, Slot::TargetGroup) {
            presets.target_group = group;
        }

        Self { storage, presets }
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    pub fn supplier(&self) -> &str {
        &self.presets.supplier
    }

    pub fn colors(&self) -> &[String] {
        &self.presets.colors
    }

    pub fn set_supplier(&mut self, supplier: impl Into<String>) -> Result<(), StorageError> {
        let supplier = supplier.into();
        if supplier == self.presets.supplier {
            return Ok(());
        }
        self.presets.supplier = supplier;
        self.storage.set(Slot::Supplier, &self.presets.supplier)
    }

    /// Appends a color if it is non-blank and not already present.
    ///
    /// Returns `true` if the color was added.
    pub fn add_color(&mut self, color: &str) -> Result<bool, StorageError> {
        let color = color.trim();
        if color.is_empty() || self.presets.colors.iter().any(|c| c == color) {
            return Ok(false);
        }
        self.presets.colors.push(color.to_string());
        write_json(&self.storage, Slot::Colors, &self.presets.colors)?;
        Ok(true)
    }

    /// Returns `true` if the color was present.
    pub fn remove_color(&mut self, color: &str) -> Result<bool, StorageError> {
        let before = self.presets.colors.len();
        self.presets.colors.retain(|c| c != color.trim());
        if self.presets.colors.len() == before {
            return Ok(false);
        }
        write_json(&self.storage, Slot::Colors, &self.presets.colors)?;
        Ok(true)
    }

    pub fn set_webhook(&mut self, url: impl Into<String>) -> Result<(), StorageError> {
        self.presets.webhook_url = url.into().trim().to_string();
        self.storage.set(Slot::Webhook, &self.presets.webhook_url)
    }

    pub fn set_target_group(&mut self, group: impl Into<String>) -> Result<(), StorageError> {
        self.presets.target_group = group.into();
        self.storage.set(Slot::TargetGroup, &self.presets.target_group)
    }

    /// Drops every preset slot and restores the defaults.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.presets = Presets::default();
        for slot in [Slot::Supplier, Slot::Colors, Slot::Webhook, Slot::TargetGroup] {
            self.storage.remove(slot)?;
        }
        Ok(())
    }
}

fn dedupe(colors: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(colors.len());
    for color in colors {
        if !unique.contains(&color) {
            unique.push(color);
        }
    }
    unique
}
