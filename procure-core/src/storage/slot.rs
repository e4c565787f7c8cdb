//! Storage slot enumeration.

use std::fmt;

/// The independent slots procurement state is persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Records,
    Supplier,
    Colors,
    Webhook,
    TargetGroup,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Records,
        Slot::Supplier,
        Slot::Colors,
        Slot::Webhook,
        Slot::TargetGroup,
    ];

    /// Returns the filename for this slot.
    pub fn filename(&self) -> &'static str {
        match self {
            Slot::Records => "procurement_records.json",
            Slot::Supplier => "last_supplier",
            Slot::Colors => "preset_colors.json",
            Slot::Webhook => "wechat_webhook",
            Slot::TargetGroup => "target_group_name",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename())
    }
}
