mod photo;
mod record;
mod store_id;
mod unit;

pub use photo::{decode_data_uri, photo_from_path, to_data_uri, PhotoError};
pub use record::{
    derive_allocations, split_color_tokens, ColorQty, ProcurementRecord, StoreAllocation,
    StoreTotal,
};
pub use store_id::{StoreId, StoreIdError, MAX_STORES};
pub use unit::Unit;
