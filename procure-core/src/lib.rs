//! Procure Core Library
//!
//! Record keeping, presets, entry flow and card export for the procurement
//! log.

pub mod app;
pub mod export;
pub mod form;
pub mod models;
pub mod presets;
pub mod router;
pub mod storage;
pub mod store;
pub mod summary;

pub use app::{AppError, Procurement};
pub use export::{
    CardError, CardFont, CommandShare, Delivery, ExportError, ExportReport, ExportSettings,
    Exporter, ShareTarget,
};
pub use form::{EntryForm, FormError};
pub use models::{
    ColorQty, PhotoError, ProcurementRecord, StoreAllocation, StoreId, StoreIdError, StoreTotal,
    Unit,
};
pub use presets::{PresetRegistry, Presets, DEFAULT_COLORS};
pub use router::{Action, Header, Router, Tab};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Slot, StorageError};
pub use store::RecordStore;
pub use summary::DaySummary;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
